pub mod classpath;
pub mod task;

pub use classpath::{get_classpath_separator, join_classpath, read_main_class_from_jar};
pub use task::{JavaProcessLauncher, ProcessorInvocation, ProcessorLauncher};
