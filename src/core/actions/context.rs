use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::downloader::{Downloader, LibraryFetcher, Mirror, MirrorSelector};
use crate::core::error::InstallerError;
use crate::core::launch::ProcessorLauncher;
use crate::core::processors::ProcessorEnv;
use crate::core::profile::InstallProfile;
use crate::core::progress::{CancellationToken, ProgressCallback};
use crate::core::resources::ResourceSource;
use crate::core::settings::InstallerSettings;

/// Decides whether an optional library, by descriptor, is installed.
pub type OptionalFilter = dyn Fn(&str) -> bool + Send + Sync;

/// Everything an install action runs against.
pub struct InstallContext<'a> {
    pub profile: &'a InstallProfile,
    pub resources: &'a dyn ResourceSource,
    pub installer_path: &'a Path,
    pub settings: &'a InstallerSettings,
    pub downloader: &'a Downloader,
    pub mirrors: &'a MirrorSelector,
    pub progress: &'a dyn ProgressCallback,
    pub cancel: &'a CancellationToken,
    pub launcher: &'a dyn ProcessorLauncher,
    pub optionals: &'a OptionalFilter,
}

impl<'a> InstallContext<'a> {
    pub async fn mirror(&self) -> Option<&'a Mirror> {
        self.mirrors.mirror(self.downloader).await
    }

    pub fn fetcher<'b>(
        &'b self,
        mirror: Option<&'b Mirror>,
        extra_dirs: &'b [PathBuf],
    ) -> LibraryFetcher<'b> {
        LibraryFetcher {
            downloader: self.downloader,
            resources: self.resources,
            progress: self.progress,
            mirror,
            extra_dirs,
        }
    }

    pub fn processor_env(&self) -> ProcessorEnv<'a> {
        ProcessorEnv {
            progress: self.progress,
            cancel: self.cancel,
            launcher: self.launcher,
            resources: self.resources,
            keep_invalid_outputs: self.settings.keep_invalid_outputs,
        }
    }

    /// Report `err` on the progress sink and hand it back.
    pub fn fail(&self, err: InstallerError) -> InstallerError {
        self.progress.stage(&err.to_string());
        err
    }

    /// Report `message` instead of the raw error, which is only logged.
    pub fn fail_with(&self, message: &str, err: InstallerError) -> InstallerError {
        self.progress.stage(message);
        warn!("{}: {}", message, err);
        err
    }
}

/// The vanilla launcher's game directory for this platform.
pub fn default_minecraft_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        dirs::data_dir().map(|d| d.join(".minecraft"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir().map(|d| d.join("minecraft"))
    } else {
        dirs::home_dir().map(|h| h.join(".minecraft"))
    }
}

/// The user's local Maven repository, if present.
pub fn maven_local_repository() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".m2").join("repository"))
        .filter(|p| p.exists())
}
