use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{InstallerError, InstallerResult};

pub const SETTINGS_FILE: &str = "installer_settings.json";
pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
const APP_USER_AGENT: &str = "ForgeWrapper/0.1.0";

/// Explicit run configuration, threaded through the HTTP client, the
/// downloader and the processor launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Never touch the network; every download attempt fails fast.
    pub offline: bool,
    /// Forced mirror base URL, overrides the profile's mirror list.
    pub mirror: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_redirects: u32,
    /// Keep processor outputs whose checksum did not validate.
    pub keep_invalid_outputs: bool,
    pub java_path: Option<PathBuf>,
    pub version_manifest_url: String,
    /// Searched for checksum-identical copies before downloading.
    pub extra_library_dirs: Vec<PathBuf>,
    pub user_agent: String,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            offline: false,
            mirror: None,
            connect_timeout_secs: 5,
            read_timeout_secs: 5,
            max_redirects: 3,
            keep_invalid_outputs: false,
            java_path: None,
            version_manifest_url: VERSION_MANIFEST_URL.to_string(),
            extra_library_dirs: Vec::new(),
            user_agent: APP_USER_AGENT.to_string(),
        }
    }
}

impl InstallerSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Read settings from a JSON file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> InstallerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| InstallerError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load `installer_settings.json` from `dir`, or defaults when it is
    /// absent or unreadable.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            debug!("No settings at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring unreadable settings {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, dir: &Path) -> InstallerResult<()> {
        let path = dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| InstallerError::io(path, e))
    }
}
