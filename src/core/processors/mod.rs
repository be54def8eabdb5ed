pub mod pipeline;

pub use pipeline::{run_steps, PostProcessors, ProcessorEnv, ProcessorPaths};
