// ─── Install Actions ───
// Client, server and extract installs over a shared context.

pub mod action;
pub mod client;
pub mod context;
pub mod extract;
pub mod libraries;
pub mod server;

pub use action::{Action, ActionKind, InstallAction};
pub use context::{default_minecraft_dir, InstallContext, OptionalFilter};
pub use libraries::download_libraries;
