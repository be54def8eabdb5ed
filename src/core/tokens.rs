// ─── Token Substitution ───
// `{KEY}` expands from the run's token table, `'text'` is emitted verbatim,
// and a backslash escapes the next character anywhere in the template.

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::Artifact;

/// Well-known keys seeded into every table before processors run.
pub const SIDE: &str = "SIDE";
pub const MINECRAFT_JAR: &str = "MINECRAFT_JAR";
pub const MINECRAFT_VERSION: &str = "MINECRAFT_VERSION";
pub const ROOT: &str = "ROOT";
pub const INSTALLER: &str = "INSTALLER";
pub const LIBRARY_DIR: &str = "LIBRARY_DIR";

/// Run-scoped string table used to expand processor arguments and outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    entries: HashMap<String, String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand `template` against this table.
    pub fn substitute(&self, template: &str) -> InstallerResult<String> {
        replace_tokens(self, template)
    }
}

impl FromIterator<(String, String)> for TokenTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Expand every `{KEY}` and `'literal'` in `template`.
///
/// The grammar is fixed: processor argument lists in published install
/// profiles are written against it.
pub fn replace_tokens(tokens: &TokenTable, template: &str) -> InstallerResult<String> {
    let malformed = |reason: String| InstallerError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or_else(|| malformed("Bad escape".into()))?;
                out.push(escaped);
            }
            '{' | '\'' => {
                let close = if c == '{' { '}' } else { '\'' };
                let mut key = String::new();
                loop {
                    match chars.next() {
                        None => return Err(malformed(format!("Unclosed {c}"))),
                        Some('\\') => {
                            let escaped =
                                chars.next().ok_or_else(|| malformed("Bad escape".into()))?;
                            key.push(escaped);
                        }
                        Some(d) if d == close => break,
                        Some(d) => key.push(d),
                    }
                }

                if c == '\'' {
                    out.push_str(&key);
                } else {
                    let value = tokens.get(&key).ok_or_else(|| InstallerError::UnresolvedToken {
                        template: template.to_string(),
                        key: key.clone(),
                    })?;
                    out.push_str(value);
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// `[group:name:version]` → `group:name:version`.
pub fn artifact_reference(value: &str) -> Option<&str> {
    value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

/// `'text'` → `text`.
pub fn quoted_literal(value: &str) -> Option<&str> {
    if value.len() < 2 {
        return None;
    }
    value
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
}

/// Resolve a value that is either an artifact reference (to its absolute
/// path under `libraries_dir`) or a token template.
pub fn resolve_value(
    tokens: &TokenTable,
    value: &str,
    libraries_dir: &Path,
) -> InstallerResult<String> {
    match artifact_reference(value) {
        Some(coord) => {
            let artifact = Artifact::parse(coord)?;
            Ok(absolute(&artifact.local_path(libraries_dir)))
        }
        None => tokens.substitute(value),
    }
}

/// Absolute, lossy string form of a path, without resolving symlinks.
pub fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
