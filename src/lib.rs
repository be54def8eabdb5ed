pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::actions::ActionKind;
pub use crate::core::error::{InstallerError, InstallerResult};
pub use crate::core::installer::{InstallReport, Installer};
pub use crate::core::maven::Artifact;
pub use crate::core::progress::{CancellationToken, ProgressCallback};
pub use crate::core::settings::InstallerSettings;

/// Install a `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,forge_wrapper_lib=debug")),
        )
        .try_init();
}
