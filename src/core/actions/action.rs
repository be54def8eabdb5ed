use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::ClientInstall;
use super::context::InstallContext;
use super::extract::ExtractInstall;
use super::server::ServerInstall;
use crate::core::downloader::GrabbedSet;
use crate::core::error::InstallerResult;
use crate::core::profile::InstallProfile;

#[async_trait]
pub trait InstallAction: Send + Sync {
    /// Install into `target`, returning the libraries that were newly placed.
    async fn run(&self, ctx: &InstallContext<'_>, target: &Path) -> InstallerResult<GrabbedSet>;

    fn is_path_valid(&self, target: &Path) -> bool;

    /// Why `target` is not valid, for display.
    fn file_error(&self, target: &Path) -> String;

    fn success_message(&self, profile: &InstallProfile, grabbed: &GrabbedSet) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Client,
    Server,
    Extract,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Client => "client",
            ActionKind::Server => "server",
            ActionKind::Extract => "extract",
        })
    }
}

/// Dispatcher over the concrete actions.
pub enum Action {
    Client(ClientInstall),
    Server(ServerInstall),
    Extract(ExtractInstall),
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Client => Self::Client(ClientInstall),
            ActionKind::Server => Self::Server(ServerInstall),
            ActionKind::Extract => Self::Extract(ExtractInstall),
        }
    }

    fn inner(&self) -> &dyn InstallAction {
        match self {
            Action::Client(a) => a,
            Action::Server(a) => a,
            Action::Extract(a) => a,
        }
    }

    pub async fn run(&self, ctx: &InstallContext<'_>, target: &Path) -> InstallerResult<GrabbedSet> {
        match self {
            Action::Client(a) => a.run(ctx, target).await,
            Action::Server(a) => a.run(ctx, target).await,
            Action::Extract(a) => a.run(ctx, target).await,
        }
    }

    pub fn is_path_valid(&self, target: &Path) -> bool {
        self.inner().is_path_valid(target)
    }

    pub fn file_error(&self, target: &Path) -> String {
        self.inner().file_error(target)
    }

    pub fn success_message(&self, profile: &InstallProfile, grabbed: &GrabbedSet) -> String {
        self.inner().success_message(profile, grabbed)
    }
}
