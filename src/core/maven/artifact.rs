use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{InstallerError, InstallerResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `group:name:version`
///   `group:name:version:classifier`
///   `group:name:version:classifier@extension`
///   `group:name:version@extension`
///
/// The derived path and filename are pure functions of the other fields, so
/// they are computed on demand rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Artifact {
    pub group: String,
    pub name: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension. Defaults to `"jar"`.
    pub extension: String,
    descriptor: String,
}

impl Artifact {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use forge_wrapper_lib::Artifact;
    /// let a = Artifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
    /// assert_eq!(a.group, "net.sf.jopt-simple");
    /// assert_eq!(a.relative_path(), "net/sf/jopt-simple/jopt-simple/5.0.4/jopt-simple-5.0.4.jar");
    /// ```
    pub fn parse(coord: &str) -> InstallerResult<Self> {
        let invalid = || InstallerError::InvalidMavenCoordinate(coord.to_string());

        let mut parts: Vec<&str> = coord.split(':').collect();
        if parts.len() < 3 {
            return Err(invalid());
        }

        // `@extension` only ever hangs off the final segment.
        let mut extension = "jar";
        let last = parts.len() - 1;
        if let Some((head, ext)) = parts[last].split_once('@') {
            if ext.is_empty() {
                return Err(invalid());
            }
            parts[last] = head;
            extension = ext;
        }

        // Segments past the classifier carry nothing we use.
        parts.truncate(4);
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        Ok(Self {
            group: parts[0].to_string(),
            name: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier: parts.get(3).map(|c| c.to_string()),
            extension: extension.to_string(),
            descriptor: coord.to_string(),
        })
    }

    /// The coordinate string this artifact was parsed from.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Re-derive a canonical coordinate, omitting the default extension.
    pub fn coordinate(&self) -> String {
        let mut out = format!("{}:{}:{}", self.group, self.name, self.version);
        if let Some(c) = &self.classifier {
            out.push(':');
            out.push_str(c);
        }
        if self.extension != "jar" {
            out.push('@');
            out.push_str(&self.extension);
        }
        out
    }

    /// Construct the group path portion (`net/sf/jopt-simple`).
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// Build the artifact filename.
    ///
    /// `name-version[-classifier].extension`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{}.{}", self.name, self.version, c, self.extension),
            None => format!("{}-{}.{}", self.name, self.version, self.extension),
        }
    }

    /// Maven repository layout path, always `/`-separated.
    ///
    /// `<group_path>/<name>/<version>/<filename>`
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.name,
            self.version,
            self.filename()
        )
    }

    /// Location of this artifact under `base`, using host separators.
    pub fn local_path(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        for segment in self.relative_path().split('/') {
            path.push(segment);
        }
        path
    }

    /// Construct the full URL for this artifact under the given repository base.
    pub fn url(&self, repo_base: &str) -> String {
        format!("{}/{}", repo_base.trim_end_matches('/'), self.relative_path())
    }
}

impl FromStr for Artifact {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Artifact::parse(s)
    }
}

impl TryFrom<String> for Artifact {
    type Error = InstallerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Artifact::parse(&value)
    }
}

impl From<Artifact> for String {
    fn from(value: Artifact) -> Self {
        value.descriptor
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let a = Artifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(a.group, "net.sf.jopt-simple");
        assert_eq!(a.name, "jopt-simple");
        assert_eq!(a.version, "5.0.4");
        assert_eq!(a.classifier, None);
        assert_eq!(a.extension, "jar");
    }

    #[test]
    fn parse_with_classifier_and_extension() {
        let a = Artifact::parse("de.oceanlabs.mcp:mcp_config:1.20.1-20230612.114412@zip").unwrap();
        assert_eq!(a.classifier, None);
        assert_eq!(a.extension, "zip");
        assert_eq!(a.filename(), "mcp_config-1.20.1-20230612.114412.zip");

        let b = Artifact::parse("net.minecraft:client:1.20.1-20230612.114412:mappings@txt").unwrap();
        assert_eq!(b.classifier.as_deref(), Some("mappings"));
        assert_eq!(b.extension, "txt");
        assert_eq!(
            b.relative_path(),
            "net/minecraft/client/1.20.1-20230612.114412/client-1.20.1-20230612.114412-mappings.txt"
        );
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        for bad in ["", "a", "a:b", "a::1", "a:b:1@", ":b:1"] {
            assert!(
                matches!(Artifact::parse(bad), Err(InstallerError::InvalidMavenCoordinate(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn extra_segments_are_ignored() {
        let a = Artifact::parse("net.minecraftforge:forge:1.20.1-47.2.0:universal:extra@zip").unwrap();
        assert_eq!(a.classifier.as_deref(), Some("universal"));
        assert_eq!(a.extension, "zip");
        assert_eq!(a.filename(), "forge-1.20.1-47.2.0-universal.zip");
        assert_eq!(a.descriptor(), "net.minecraftforge:forge:1.20.1-47.2.0:universal:extra@zip");
    }

    #[test]
    fn coordinate_round_trips() {
        for coord in [
            "org.ow2.asm:asm:9.5",
            "org.lwjgl:lwjgl:3.3.1:natives-linux",
            "net.minecraftforge:forge:1.20.1-47.2.0:universal@zip",
            "com.example:lib:1.0@pom",
        ] {
            let a = Artifact::parse(coord).unwrap();
            let again = Artifact::parse(&a.coordinate()).unwrap();
            assert_eq!(a.relative_path(), again.relative_path());
            assert_eq!(a.coordinate(), coord);
        }
    }

    #[test]
    fn explicit_jar_extension_normalizes() {
        let a = Artifact::parse("com.example:lib:1.0@jar").unwrap();
        assert_eq!(a.coordinate(), "com.example:lib:1.0");
        assert_eq!(a.descriptor(), "com.example:lib:1.0@jar");
    }

    #[test]
    fn local_path_construction() {
        let a = Artifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        let p = a.local_path(Path::new("libs"));
        assert_eq!(
            p,
            PathBuf::from("libs")
                .join("org")
                .join("lwjgl")
                .join("lwjgl")
                .join("3.3.3")
                .join("lwjgl-3.3.3-natives-windows.jar")
        );
    }

    #[test]
    fn url_construction() {
        let a = Artifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(
            a.url("https://libraries.minecraft.net/"),
            "https://libraries.minecraft.net/net/sf/jopt-simple/jopt-simple/5.0.4/jopt-simple-5.0.4.jar"
        );
    }

    #[test]
    fn deserializes_from_json_string() {
        let a: Artifact = serde_json::from_str("\"org.ow2.asm:asm:9.5\"").unwrap();
        assert_eq!(a.name, "asm");
        assert!(serde_json::from_str::<Artifact>("\"broken\"").is_err());
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"org.ow2.asm:asm:9.5\"");
    }
}
