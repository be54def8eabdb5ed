// ─── Library Fetching ───
// Resolve one library onto disk: existing file, bundled copy, local
// repository, then the network.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::client::Downloader;
use super::mirror::Mirror;
use crate::core::checksum::{same_digest, sha1_file, HashFunction};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::Artifact;
use crate::core::progress::{MessagePriority, ProgressCallback};
use crate::core::resources::ResourceSource;
use crate::core::version::{Download, Library, LibraryDownload};

/// Where a library ended up coming from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Excluded by the optional-library predicate.
    Disabled,
    /// Already on disk and valid.
    Existing,
    /// Copied out of the installer's bundled `maven/` tree.
    Extracted,
    /// Copied from an additional local repository.
    CopiedLocal(PathBuf),
    Downloaded,
}

impl FetchOutcome {
    /// Whether the file was newly placed on disk by this fetch.
    pub fn is_new(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Extracted | FetchOutcome::CopiedLocal(_) | FetchOutcome::Downloaded
        )
    }
}

/// Libraries newly placed on disk during this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrabbedSet(Vec<Artifact>);

impl GrabbedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.0.push(artifact);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.0.contains(artifact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.0.iter()
    }
}

/// Everything a single library fetch needs besides the library itself.
pub struct LibraryFetcher<'a> {
    pub downloader: &'a Downloader,
    pub resources: &'a dyn ResourceSource,
    pub progress: &'a dyn ProgressCallback,
    pub mirror: Option<&'a Mirror>,
    pub extra_dirs: &'a [PathBuf],
}

impl LibraryFetcher<'_> {
    fn say(&self, text: &str) {
        self.progress.message(text, MessagePriority::Normal);
    }

    /// Make `library` present and valid under `root`.
    ///
    /// Steps are tried in order and the first that succeeds wins. A library
    /// without a declared checksum is trusted as soon as it exists.
    pub async fn fetch(
        &self,
        library: &Library,
        root: &Path,
        enabled: &(dyn Fn(&str) -> bool + Send + Sync),
    ) -> InstallerResult<FetchOutcome> {
        let artifact = &library.name;
        let target = artifact.local_path(root);
        let download = library.download();
        let sha1 = download.sha1();

        if !enabled(artifact.descriptor()) {
            self.say(&format!("Considering library {}: Not Downloading {{Disabled}}", artifact));
            return Ok(FetchOutcome::Disabled);
        }

        self.say(&format!("Considering library {}", artifact));

        if target.exists() {
            match sha1 {
                None => {
                    self.say("  File exists: No checksum, Assuming valid.");
                    return Ok(FetchOutcome::Existing);
                }
                Some(expected) => {
                    let actual = sha1_file(&target)?;
                    if same_digest(expected, &actual) {
                        self.say("  File exists: Checksum validated.");
                        return Ok(FetchOutcome::Existing);
                    }
                    self.say("  File exists: Checksum invalid, deleting file:");
                    self.say(&format!("    Expected: {}", expected));
                    self.say(&format!("    Found:    {}", actual));
                    if std::fs::remove_file(&target).is_err() {
                        self.progress.stage("    Failed to delete file, aborting.");
                        return Err(InstallerError::DeleteFailed(target));
                    }
                }
            }
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| InstallerError::io(parent, e))?;
        }

        if let Some(outcome) = self.extract_bundled(artifact, &target, sha1)? {
            return Ok(outcome);
        }

        if let Some(expected) = sha1 {
            if let Some(outcome) = self.copy_from_local(artifact, &target, expected)? {
                return Ok(outcome);
            }
        }

        if download.url().is_empty() {
            self.say("  Invalid library, missing url");
            return Err(InstallerError::MissingUrl(artifact.to_string()));
        }

        self.download_library(&download, &target).await?;
        Ok(FetchOutcome::Downloaded)
    }

    fn extract_bundled(
        &self,
        artifact: &Artifact,
        target: &Path,
        sha1: Option<&str>,
    ) -> InstallerResult<Option<FetchOutcome>> {
        let name = format!("maven/{}", artifact.relative_path());
        let Some(bytes) = self.resources.read(&name)? else {
            return Ok(None);
        };

        self.say(&format!("  Extracting library from /{}", name));
        std::fs::write(target, &bytes).map_err(|e| InstallerError::io(target, e))?;

        let Some(expected) = sha1 else {
            self.say("    Extraction completed: No checksum, Assuming valid.");
            return Ok(Some(FetchOutcome::Extracted));
        };

        let actual = HashFunction::Sha1.hash(&bytes);
        if same_digest(expected, &actual) {
            self.say("    Extraction completed: Checksum validated.");
            return Ok(Some(FetchOutcome::Extracted));
        }

        self.say("    Invalid checksum, extracted file from installer is corrupt:");
        self.say(&format!("      Expected: {}", expected));
        self.say(&format!("      Actual:   {}", actual));
        if std::fs::remove_file(target).is_err() {
            return Err(InstallerError::DeleteFailed(target.to_path_buf()));
        }
        Err(InstallerError::ChecksumMismatch {
            path: target.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }

    fn copy_from_local(
        &self,
        artifact: &Artifact,
        target: &Path,
        expected: &str,
    ) -> InstallerResult<Option<FetchOutcome>> {
        for dir in self.extra_dirs {
            let candidate = artifact.local_path(dir);
            if !candidate.exists() {
                continue;
            }

            self.say(&format!("  Found artifact in local folder {}", dir.display()));
            let actual = match sha1_file(&candidate) {
                Ok(actual) => actual,
                Err(e) => {
                    debug!("Could not hash {:?}: {}", candidate, e);
                    continue;
                }
            };
            if !same_digest(expected, &actual) {
                self.say("    Invalid checksum. Not using.");
                continue;
            }
            self.say("    Checksum validated");

            match std::fs::copy(&candidate, target) {
                Ok(_) => {
                    self.say("    Successfully copied local file");
                    return Ok(Some(FetchOutcome::CopiedLocal(dir.clone())));
                }
                Err(e) => {
                    self.say(&format!("    Failed to copy from local folder: {}", e));
                    if target.exists() && std::fs::remove_file(target).is_err() {
                        self.say("    Failed to delete failed copy, aborting");
                        return Err(InstallerError::DeleteFailed(target.to_path_buf()));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Download a library, through the mirror first when it applies.
    pub async fn download_library(
        &self,
        download: &LibraryDownload,
        target: &Path,
    ) -> InstallerResult<()> {
        let url = download.url();
        if let Some(mirror) = self.mirror {
            if Mirror::applies_to(url, &download.path) {
                let mirrored = mirror.url_for(&download.path);
                match self.download_verified(&mirrored, download.sha1(), target).await {
                    Ok(()) => return Ok(()),
                    Err(e) => warn!("Mirror download of {} failed, falling back: {}", mirrored, e),
                }
            }
        }
        self.download_verified(url, download.sha1(), target).await
    }

    /// Download a plain file such as the vanilla game jar. Never mirrored.
    pub async fn download_file(&self, download: &Download, target: &Path) -> InstallerResult<()> {
        let url = download.url();
        if url.is_empty() {
            return Err(InstallerError::MissingUrl(target.display().to_string()));
        }
        self.download_verified(url, download.sha1(), target).await
    }

    async fn download_verified(
        &self,
        url: &str,
        sha1: Option<&str>,
        target: &Path,
    ) -> InstallerResult<()> {
        self.say(&format!("  Downloading library from {}", url));
        match self.downloader.download_file(url, target, sha1).await {
            Ok(()) => {
                match sha1 {
                    Some(_) => self.say("    Download completed: Checksum validated."),
                    None => self.say("    Download completed: No checksum, Assuming valid."),
                }
                Ok(())
            }
            Err(InstallerError::ChecksumMismatch {
                path,
                expected,
                actual,
            }) => {
                self.say("    Download failed: Checksum invalid, deleting file:");
                self.say(&format!("      Expected: {}", expected));
                self.say(&format!("      Actual:   {}", actual));
                Err(InstallerError::ChecksumMismatch {
                    path,
                    expected,
                    actual,
                })
            }
            Err(e) => {
                self.say(&format!("    Download failed: {}", e));
                Err(e)
            }
        }
    }
}
