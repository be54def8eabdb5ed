// ─── Installer Resources ───
// Read-only view of the files bundled inside the installer jar.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::Artifact;

/// Content-addressable lookup of bundled files by name.
///
/// Names may carry a leading `/`; it is ignored.
pub trait ResourceSource: Send + Sync {
    fn read(&self, name: &str) -> InstallerResult<Option<Vec<u8>>>;

    fn require(&self, name: &str) -> InstallerResult<Vec<u8>> {
        self.read(name)?
            .ok_or_else(|| InstallerError::MissingResource(name.to_string()))
    }

    /// Copy a bundled file to `dest`, creating parent directories.
    /// Returns `false` when no such file is bundled.
    fn extract_to(&self, name: &str, dest: &Path) -> InstallerResult<bool> {
        let Some(bytes) = self.read(name)? else {
            return Ok(false);
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| InstallerError::io(parent, e))?;
        }
        std::fs::write(dest, bytes).map_err(|e| InstallerError::io(dest, e))?;
        Ok(true)
    }

    /// Extract the bundled copy of `artifact` (under `maven/`) to `dest`.
    fn extract_artifact(&self, artifact: &Artifact, dest: &Path) -> InstallerResult<bool> {
        self.extract_to(&format!("maven/{}", artifact.relative_path()), dest)
    }
}

fn entry_name(name: &str) -> &str {
    name.trim_start_matches('/')
}

/// The installer jar, held in memory.
pub struct InstallerArchive {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl InstallerArchive {
    pub fn open(path: &Path) -> InstallerResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| InstallerError::io(path, e))?;
        Self::from_bytes(path, bytes)
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> InstallerResult<Self> {
        // Reject non-zip input up front rather than on first lookup.
        zip::ZipArchive::new(Cursor::new(bytes.as_slice()))?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Where the installer jar lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceSource for InstallerArchive {
    fn read(&self, name: &str) -> InstallerResult<Option<Vec<u8>>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut file = match archive.by_name(entry_name(name)) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut out)
            .map_err(|e| InstallerError::io(&self.path, e))?;
        debug!("Read {} ({} bytes) from installer", name, out.len());
        Ok(Some(out))
    }
}

/// In-memory bundle, handy for callers that already unpacked the installer.
impl ResourceSource for HashMap<String, Vec<u8>> {
    fn read(&self, name: &str) -> InstallerResult<Option<Vec<u8>>> {
        Ok(self.get(entry_name(name)).cloned())
    }
}
