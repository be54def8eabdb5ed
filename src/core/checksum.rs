// ─── Checksums ───
// File hashing shared by library verification and processor output caching.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::Md5;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::core::error::{InstallerError, InstallerResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Md5,
    Sha1,
    Sha256,
}

impl HashFunction {
    /// Width of the hex digest, e.g. 40 for SHA-1.
    pub fn hex_len(self) -> usize {
        match self {
            HashFunction::Md5 => 32,
            HashFunction::Sha1 => 40,
            HashFunction::Sha256 => 64,
        }
    }

    /// Lowercase, zero-padded hex digest of `data`.
    pub fn hash(self, data: &[u8]) -> String {
        match self {
            HashFunction::Md5 => hex::encode(Md5::digest(data)),
            HashFunction::Sha1 => hex::encode(Sha1::digest(data)),
            HashFunction::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    /// Hash a file without loading it into memory at once.
    pub fn hash_file(self, path: &Path) -> InstallerResult<String> {
        match self {
            HashFunction::Md5 => digest_file::<Md5>(path),
            HashFunction::Sha1 => digest_file::<Sha1>(path),
            HashFunction::Sha256 => digest_file::<Sha256>(path),
        }
    }
}

fn digest_file<D: Digest>(path: &Path) -> InstallerResult<String> {
    let mut file = File::open(path).map_err(|e| InstallerError::io(path, e))?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| InstallerError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// SHA-1 of a file, the checksum used by library and output declarations.
pub fn sha1_file(path: &Path) -> InstallerResult<String> {
    HashFunction::Sha1.hash_file(path)
}

/// Compare two hex digests.
pub fn same_digest(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}

/// An absent or empty checksum means "trust on arrival" and always passes.
pub fn checksum_valid(path: &Path, expected: Option<&str>) -> InstallerResult<bool> {
    match expected.filter(|e| !e.is_empty()) {
        None => Ok(true),
        Some(expected) => Ok(same_digest(expected, &sha1_file(path)?)),
    }
}
