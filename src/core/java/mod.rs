// ─── Java Runtime ───
// Locates the `java` binary used to run processors.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::settings::InstallerSettings;

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// `bin/java` under a runtime root, also checking the macOS bundle layout.
pub fn locate_java_binary(runtime_root: &Path) -> PathBuf {
    let primary = runtime_root.join("bin").join(java_exe());
    if primary.exists() {
        return primary;
    }

    let mac_layout = runtime_root
        .join("Contents")
        .join("Home")
        .join("bin")
        .join(java_exe());
    if mac_layout.exists() {
        return mac_layout;
    }

    primary
}

/// Pick the Java binary: configured path, then `JAVA_HOME`, then whatever
/// `java` resolves to on `PATH`.
pub fn resolve_java_binary(settings: &InstallerSettings) -> PathBuf {
    if let Some(path) = settings.java_path.as_ref().filter(|p| p.exists()) {
        debug!("Using configured Java {:?}", path);
        return path.clone();
    }

    if let Some(home) = std::env::var_os("JAVA_HOME").filter(|h| !h.is_empty()) {
        let candidate = locate_java_binary(Path::new(&home));
        if candidate.exists() {
            debug!("Using Java from JAVA_HOME {:?}", candidate);
            return candidate;
        }
    }

    PathBuf::from(java_exe())
}
