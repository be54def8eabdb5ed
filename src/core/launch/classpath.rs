// ─── Processor Classpath ───
// Jar manifest reading and classpath assembly for processor runs.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::error::{InstallerError, InstallerResult};

/// Platform-specific Java classpath separator.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

pub fn join_classpath(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(get_classpath_separator())
}

/// Read `Main-Class` from a jar's `META-INF/MANIFEST.MF`.
///
/// Manifest lines longer than 72 bytes wrap onto continuation lines that
/// start with a single space.
pub fn read_main_class_from_jar(path: &Path) -> InstallerResult<String> {
    let missing = || InstallerError::MissingMainClass(path.to_path_buf());

    let file = std::fs::File::open(path).map_err(|e| InstallerError::io(path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut manifest = archive.by_name("META-INF/MANIFEST.MF").map_err(|_| missing())?;

    let mut text = String::new();
    manifest
        .read_to_string(&mut text)
        .map_err(|e| InstallerError::io(path, e))?;

    let mut main_class: Option<String> = None;
    let mut current_key: Option<String> = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if current_key.as_deref() == Some("Main-Class") {
                if let Some(value) = &mut main_class {
                    value.push_str(rest.trim_end());
                }
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            current_key = Some(key.trim().to_string());
            if key.trim() == "Main-Class" {
                main_class = Some(value.trim().to_string());
            }
        }
    }

    main_class.filter(|c| !c.is_empty()).ok_or_else(missing)
}
