// ─── Version File ───
// A version descriptor: downloadable game jars plus the libraries they need.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::downloader::Downloader;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::Artifact;
use crate::core::resources::ResourceSource;
use crate::core::version::manifest::VersionManifest;

/// A parsed version JSON. Only the parts the installer consumes are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    /// Keyed by side, e.g. `client`, `server`.
    #[serde(default)]
    pub downloads: HashMap<String, Download>,
    #[serde(default)]
    pub libraries: Vec<Library>,
}

/// A downloadable file. `provided` files ship with the installer and have
/// no URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Download {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub provided: bool,
}

impl Download {
    /// Remote URL, or `""` when the file is provided or has none.
    pub fn url(&self) -> &str {
        if self.provided {
            return "";
        }
        self.url.as_deref().unwrap_or_default()
    }

    /// Expected SHA-1, ignoring empty values.
    pub fn sha1(&self) -> Option<&str> {
        self.sha1.as_deref().filter(|s| !s.is_empty())
    }
}

/// A library download: a [`Download`] plus its repository-relative path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownload {
    #[serde(flatten)]
    pub download: Download,
    #[serde(default)]
    pub path: String,
}

impl LibraryDownload {
    pub fn url(&self) -> &str {
        self.download.url()
    }

    pub fn sha1(&self) -> Option<&str> {
        self.download.sha1()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryDownload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    pub name: Artifact,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
}

impl Library {
    pub fn new(name: Artifact) -> Self {
        Self {
            name,
            downloads: None,
        }
    }

    /// The declared artifact download, synthesized from the coordinate when
    /// absent: no URL, no checksum, the coordinate's repository path.
    pub fn download(&self) -> LibraryDownload {
        let mut download = self
            .downloads
            .as_ref()
            .and_then(|d| d.artifact.clone())
            .unwrap_or_default();
        if download.path.is_empty() {
            download.path = self.name.relative_path();
        }
        download
    }
}

impl VersionDescriptor {
    pub fn parse(bytes: &[u8]) -> InstallerResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn read(path: &Path) -> InstallerResult<Self> {
        let raw = std::fs::read(path).map_err(|e| InstallerError::io(path, e))?;
        Self::parse(&raw)
    }

    /// Read a descriptor bundled with the installer, e.g. `/version.json`.
    pub fn from_resources(resources: &dyn ResourceSource, name: &str) -> InstallerResult<Self> {
        Self::parse(&resources.require(name)?)
    }

    pub fn download(&self, key: &str) -> Option<&Download> {
        self.downloads.get(key)
    }

    /// Load the vanilla descriptor for `version`, caching it at `cache`.
    ///
    /// Once the cache file exists it is read as-is and the catalog is never
    /// consulted again.
    pub async fn load_cached(
        downloader: &Downloader,
        manifest_url: &str,
        version: &str,
        cache: &Path,
    ) -> InstallerResult<Self> {
        if cache.exists() {
            debug!("Using cached version json {:?}", cache);
        } else {
            let manifest = VersionManifest::fetch(downloader, manifest_url).await?;
            let entry = manifest
                .find_version(version)
                .ok_or_else(|| InstallerError::VersionNotFound(version.to_string()))?;

            info!("Downloading version json for {}", version);
            downloader
                .download_file(&entry.url, cache, entry.sha1.as_deref())
                .await?;
        }

        Self::read(cache)
    }
}
