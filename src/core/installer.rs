// ─── Installer ───
// Entry point: open the installer archive, load its profile and run one
// install action against a target directory.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::actions::{Action, ActionKind, InstallContext, OptionalFilter};
use crate::core::downloader::{Downloader, MirrorSelector};
use crate::core::error::InstallerResult;
use crate::core::launch::{JavaProcessLauncher, ProcessorLauncher};
use crate::core::profile::InstallProfile;
use crate::core::progress::{CancellationToken, ProgressCallback, TracingProgress};
use crate::core::resources::InstallerArchive;
use crate::core::settings::InstallerSettings;

/// Summary of a finished install.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub action: ActionKind,
    pub profile: String,
    pub version: String,
    pub grabbed: Vec<String>,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Installer {
    installer_path: PathBuf,
    target: PathBuf,
    kind: ActionKind,
    settings: InstallerSettings,
    progress: Arc<dyn ProgressCallback>,
    cancel: CancellationToken,
    launcher: Option<Arc<dyn ProcessorLauncher>>,
    optionals: Arc<OptionalFilter>,
}

impl Installer {
    pub fn new(
        installer_path: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        kind: ActionKind,
    ) -> Self {
        Self {
            installer_path: installer_path.into(),
            target: target.into(),
            kind,
            settings: InstallerSettings::default(),
            progress: Arc::new(TracingProgress),
            cancel: CancellationToken::new(),
            launcher: None,
            optionals: Arc::new(|_: &str| true),
        }
    }

    pub fn with_settings(mut self, settings: InstallerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the default `java -cp` launcher used for processors.
    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessorLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_optionals(mut self, optionals: Arc<OptionalFilter>) -> Self {
        self.optionals = optionals;
        self
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self) -> InstallerResult<InstallReport> {
        let started_at = Utc::now();
        let archive = InstallerArchive::open(&self.installer_path)?;
        let profile = InstallProfile::from_resources(&archive)?;
        info!(
            "Installing {} ({}) for minecraft {} into {:?}",
            profile.profile, self.kind, profile.minecraft, self.target
        );

        let downloader = Downloader::new(&self.settings)?;
        let mirrors =
            MirrorSelector::new(self.settings.mirror.clone(), profile.mirror_list.clone());
        let launcher: Arc<dyn ProcessorLauncher> = match &self.launcher {
            Some(launcher) => launcher.clone(),
            None => Arc::new(JavaProcessLauncher::from_settings(&self.settings)),
        };

        let action = Action::new(self.kind);
        if !action.is_path_valid(&self.target) {
            warn!("{}", action.file_error(&self.target));
        }

        let ctx = InstallContext {
            profile: &profile,
            resources: &archive,
            installer_path: &self.installer_path,
            settings: &self.settings,
            downloader: &downloader,
            mirrors: &mirrors,
            progress: self.progress.as_ref(),
            cancel: &self.cancel,
            launcher: launcher.as_ref(),
            optionals: self.optionals.as_ref(),
        };
        let grabbed = action.run(&ctx, &self.target).await?;

        let message = action.success_message(&profile, &grabbed);
        self.progress.stage(&message);
        Ok(InstallReport {
            action: self.kind,
            profile: profile.profile.clone(),
            version: profile.version.clone(),
            grabbed: grabbed.iter().map(|a| a.to_string()).collect(),
            message,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Run and log the outcome; `true` on success.
    pub async fn install(&self) -> bool {
        match self.run().await {
            Ok(report) => {
                info!("{}", report.message);
                true
            }
            Err(e) if e.is_cancellation() => {
                warn!("Installation Canceled");
                self.progress.stage("Installation Canceled");
                false
            }
            Err(e) => {
                error!("There was an exception running task: {}", e);
                self.progress
                    .stage(&format!("There was an exception running task: {}", e));
                false
            }
        }
    }
}
