use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installer core.
/// Every module returns `Result<T, InstallerError>`.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Too many redirects while fetching {url}")]
    TooManyRedirects { url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Offline mode: not downloading {0}")]
    Offline(String),

    // ── Integrity ───────────────────────────────────────
    #[error("Checksum mismatch for {path:?}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Failed to delete invalid file {0:?}")]
    DeleteFailed(PathBuf),

    // ── Input ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("Illegal pattern ({reason}): {template}")]
    MalformedTemplate { template: String, reason: String },

    #[error("Illegal pattern: {template} Missing Key: {key}")]
    UnresolvedToken { template: String, key: String },

    #[error("Invalid install profile spec: {0} Only 0, and 1 are supported")]
    UnsupportedSpec(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Resource not found in installer archive: {0}")]
    MissingResource(String),

    // ── Library pass ────────────────────────────────────
    #[error("Invalid library {0}: missing url")]
    MissingUrl(String),

    #[error("These libraries failed to download:{}", format_list(.0))]
    LibrariesFailed(Vec<String>),

    #[error("Minecraft version {0} not found in version manifest")]
    VersionNotFound(String),

    // ── Processors ──────────────────────────────────────
    #[error("Failed to extract files from archive:{}", format_list(.0))]
    ExtractionFailed(Vec<String>),

    #[error("Invalid configuration, bad output config: [{key}: {value}]")]
    InvalidOutputConfig { key: String, value: String },

    #[error("Missing Jar for processor: {0:?}")]
    MissingProcessorJar(PathBuf),

    #[error("Jar does not have main class: {0:?}")]
    MissingMainClass(PathBuf),

    #[error("Missing Processor Dependencies:{}", format_list(.0))]
    MissingProcessorDependencies(Vec<String>),

    #[error("Failed to run processor: {}{}", .category, detail(.message))]
    ProcessorFailed { category: String, message: String },

    #[error("Processor failed, invalid outputs:{0}")]
    InvalidProcessorOutputs(String),

    // ── Install actions ─────────────────────────────────
    #[error("Invalid install target {path:?}: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("Installation cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl InstallerError {
    /// Cancellation is a clean early exit, not a defect.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, InstallerError::Cancelled)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallerError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(source: std::io::Error) -> Self {
        InstallerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

fn format_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\n  {item}")).collect()
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(":{message}")
    }
}
