// ─── Version Manifest ───
// Mojang's catalog of game versions, used to locate a version descriptor.

use serde::Deserialize;
use tracing::info;

use crate::core::downloader::Downloader;
use crate::core::error::InstallerResult;

/// Top-level version catalog.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionManifest {
    /// Fetch the catalog from `url`.
    pub async fn fetch(downloader: &Downloader, url: &str) -> InstallerResult<Self> {
        info!("Fetching Minecraft version manifest...");
        let manifest: VersionManifest = downloader.fetch_json(url).await?;
        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }
}
