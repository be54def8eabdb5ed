// ─── Install Profile ───
// `install_profile.json`: what to install, which libraries it needs and
// the processors that finish the job.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::Artifact;
use crate::core::resources::ResourceSource;
use crate::core::version::Library;

pub const PROFILE_FILE: &str = "install_profile.json";
const DEFAULT_SERVER_JAR: &str = "{ROOT}/minecraft_server.{MINECRAFT_VERSION}.jar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallProfile {
    #[serde(default)]
    pub spec: u64,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub minecraft: String,
    /// Name of the bundled version json, e.g. `/version.json`.
    #[serde(default)]
    pub json: String,
    #[serde(default)]
    pub logo: Option<String>,
    /// The contained artifact, if the installer ships one.
    #[serde(default)]
    pub path: Option<Artifact>,
    #[serde(default)]
    pub url_icon: Option<String>,
    #[serde(default)]
    pub welcome: Option<String>,
    #[serde(default)]
    pub mirror_list: Option<String>,
    #[serde(default)]
    pub hide_client: bool,
    #[serde(default)]
    pub hide_server: bool,
    #[serde(default)]
    pub hide_extract: bool,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub processors: Vec<Processor>,
    #[serde(default)]
    pub data: BTreeMap<String, DataEntry>,
    #[serde(default)]
    server_jar_path: Option<String>,
}

/// One post-install step: a Java program run from the libraries directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Processor {
    /// Sides this step runs on; absent means every side.
    #[serde(default)]
    pub sides: Option<Vec<String>>,
    pub jar: Artifact,
    #[serde(default)]
    pub classpath: Vec<Artifact>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Output path expression → expected SHA-1 expression.
    #[serde(default)]
    pub outputs: BTreeMap<String, Option<String>>,
}

impl Processor {
    pub fn applies_to(&self, side: Side) -> bool {
        match &self.sides {
            None => true,
            Some(sides) => sides.iter().any(|s| s == side.as_str()),
        }
    }
}

/// Per-side value of a profile data entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataEntry {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
}

impl DataEntry {
    pub fn value(&self, side: Side) -> Option<&str> {
        match side {
            Side::Client => self.client.as_deref(),
            Side::Server => self.server.as_deref(),
        }
    }
}

impl InstallProfile {
    /// Parse a profile, rejecting spec versions other than 0 and 1.
    ///
    /// Spec 0 predates `serverJarPath`; it is ignored there.
    pub fn parse(bytes: &[u8]) -> InstallerResult<Self> {
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        let spec = raw.get("spec").and_then(|s| s.as_u64()).unwrap_or(0);
        if spec > 1 {
            return Err(InstallerError::UnsupportedSpec(spec));
        }

        let mut profile: InstallProfile = serde_json::from_value(raw)?;
        if spec == 0 {
            profile.server_jar_path = None;
        }
        Ok(profile)
    }

    pub fn from_resources(resources: &dyn ResourceSource) -> InstallerResult<Self> {
        Self::parse(&resources.require(PROFILE_FILE)?)
    }

    /// Server jar location template, with `{ROOT}`, `{MINECRAFT_VERSION}`
    /// and `{LIBRARY_DIR}` available.
    pub fn server_jar_path(&self) -> &str {
        self.server_jar_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_SERVER_JAR)
    }

    pub fn processors_for(&self, side: Side) -> Vec<&Processor> {
        self.processors
            .iter()
            .filter(|p| p.applies_to(side))
            .collect()
    }

    /// Raw data values for `side`, before resolution.
    pub fn data_for(&self, side: Side) -> BTreeMap<String, String> {
        self.data
            .iter()
            .filter_map(|(k, v)| v.value(side).map(|v| (k.clone(), v.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{
        "spec": 1,
        "profile": "forge",
        "version": "1.20.1-forge-47.2.0",
        "path": "net.minecraftforge:forge:1.20.1-47.2.0",
        "minecraft": "1.20.1",
        "serverJarPath": "{LIBRARY_DIR}/net/minecraft/server/{MINECRAFT_VERSION}/server-{MINECRAFT_VERSION}.jar",
        "json": "/version.json",
        "mirrorList": "https://files.minecraftforge.net/mirrors-2.0.json",
        "data": {
            "MAPPINGS": { "client": "[de.oceanlabs.mcp:mcp_config:1.20.1@zip]", "server": "[de.oceanlabs.mcp:mcp_config:1.20.1@zip]" },
            "BINPATCH": { "client": "/data/client.lzma", "server": "/data/server.lzma" },
            "CLIENT_ONLY": { "client": "'x'" }
        },
        "processors": [
            { "sides": ["server"], "jar": "net.minecraftforge:installertools:1.3.0", "classpath": ["net.md-5:SpecialSource:1.11.0"], "args": ["--task", "EXTRACT_FILES"] },
            { "jar": "net.minecraftforge:binarypatcher:1.1.1", "args": ["--patch", "{BINPATCH}"], "outputs": { "{PATCHED}": "{PATCHED_SHA}" } }
        ],
        "libraries": [ { "name": "net.minecraftforge:installertools:1.3.0" } ]
    }"#;

    #[test]
    fn parses_spec_one() {
        let profile = InstallProfile::parse(PROFILE.as_bytes()).unwrap();
        assert_eq!(profile.minecraft, "1.20.1");
        assert_eq!(profile.path.as_ref().unwrap().name, "forge");
        assert!(profile.server_jar_path().starts_with("{LIBRARY_DIR}"));
        assert_eq!(profile.processors_for(Side::Client).len(), 1);
        assert_eq!(profile.processors_for(Side::Server).len(), 2);
        assert_eq!(profile.processors[1].outputs.len(), 1);
    }

    #[test]
    fn data_is_per_side() {
        let profile = InstallProfile::parse(PROFILE.as_bytes()).unwrap();
        let client = profile.data_for(Side::Client);
        let server = profile.data_for(Side::Server);
        assert_eq!(client.get("BINPATCH").unwrap(), "/data/client.lzma");
        assert_eq!(server.get("BINPATCH").unwrap(), "/data/server.lzma");
        assert!(client.contains_key("CLIENT_ONLY"));
        assert!(!server.contains_key("CLIENT_ONLY"));
    }

    #[test]
    fn spec_zero_ignores_server_jar_path() {
        let json = PROFILE.replace("\"spec\": 1", "\"spec\": 0");
        let profile = InstallProfile::parse(json.as_bytes()).unwrap();
        assert_eq!(
            profile.server_jar_path(),
            "{ROOT}/minecraft_server.{MINECRAFT_VERSION}.jar"
        );
    }

    #[test]
    fn unknown_spec_is_rejected() {
        let err = InstallProfile::parse(br#"{ "spec": 2 }"#).unwrap_err();
        assert!(matches!(err, InstallerError::UnsupportedSpec(2)));
        assert_eq!(
            err.to_string(),
            "Invalid install profile spec: 2 Only 0, and 1 are supported"
        );
    }

    #[test]
    fn missing_spec_means_zero() {
        let profile = InstallProfile::parse(br#"{ "minecraft": "1.12.2" }"#).unwrap();
        assert_eq!(profile.spec, 0);
        assert!(profile.processors.is_empty());
        assert!(profile.path.is_none());
    }
}
