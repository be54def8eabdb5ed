// ─── Mirrors ───
// Optional alternate base URL for library downloads, chosen once per run.

use rand::seq::IndexedRandom;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::client::Downloader;
use crate::core::maven::MOJANG_LIBRARIES;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mirror {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default)]
    pub homepage: String,
    #[serde(alias = "baseUrl")]
    pub url: String,
}

impl Mirror {
    /// A mirror forced by configuration rather than advertised by a list.
    pub fn forced(url: &str) -> Self {
        Self {
            name: "Mirror".to_string(),
            image: None,
            homepage: url.to_string(),
            url: url.to_string(),
        }
    }

    pub fn sponsor_message(&self) -> String {
        format!("Data kindly mirrored by {} at {}", self.name, self.homepage)
    }

    /// Whether `url` is eligible for this mirror: an http(s) download outside
    /// Mojang's own library host whose URL ends in the artifact path.
    pub fn applies_to(url: &str, path: &str) -> bool {
        !path.is_empty()
            && url.starts_with("http")
            && !url.starts_with(MOJANG_LIBRARIES)
            && url.ends_with(path)
    }

    /// Mirror URL for a repository-relative `path`.
    pub fn url_for(&self, path: &str) -> String {
        if self.url.ends_with('/') {
            format!("{}{}", self.url, path)
        } else {
            format!("{}/{}", self.url, path)
        }
    }
}

/// Lazily picks a mirror and keeps that choice for the rest of the run.
///
/// A configured mirror always wins. Otherwise the profile's mirror list is
/// fetched once and one entry is chosen at random; any failure there means
/// "no mirror", also remembered.
pub struct MirrorSelector {
    forced: Option<String>,
    list_url: Option<String>,
    selected: OnceCell<Option<Mirror>>,
}

impl MirrorSelector {
    pub fn new(forced: Option<String>, list_url: Option<String>) -> Self {
        Self {
            forced: forced.filter(|u| !u.is_empty()),
            list_url: list_url.filter(|u| !u.is_empty()),
            selected: OnceCell::new(),
        }
    }

    pub fn none() -> Self {
        Self::new(None, None)
    }

    pub async fn mirror(&self, downloader: &Downloader) -> Option<&Mirror> {
        self.selected
            .get_or_init(|| self.select(downloader))
            .await
            .as_ref()
    }

    async fn select(&self, downloader: &Downloader) -> Option<Mirror> {
        if let Some(url) = &self.forced {
            info!("Using configured mirror {}", url);
            return Some(Mirror::forced(url));
        }

        let list_url = self.list_url.as_deref()?;
        let mirrors: Vec<Mirror> = match downloader.fetch_json(list_url).await {
            Ok(mirrors) => mirrors,
            Err(e) => {
                warn!("Unable to fetch mirror list {}: {}", list_url, e);
                return None;
            }
        };

        let chosen = mirrors.choose(&mut rand::rng()).cloned();
        if let Some(mirror) = &chosen {
            info!("{}", mirror.sponsor_message());
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_follows_host_and_path() {
        let path = "net/minecraftforge/forge/1.20.1-47.2.0/forge-1.20.1-47.2.0-universal.jar";
        let forge = format!("https://maven.minecraftforge.net/{path}");
        let mojang = format!("https://libraries.minecraft.net/{path}");

        assert!(Mirror::applies_to(&forge, path));
        assert!(!Mirror::applies_to(&mojang, path));
        assert!(!Mirror::applies_to("https://maven.example/other.jar", path));
        assert!(!Mirror::applies_to("", path));
        assert!(!Mirror::applies_to(&forge, ""));
    }

    #[test]
    fn list_entries_accept_aliases() {
        let json = r#"[
            { "name": "Example", "imageUrl": "https://m.example/logo.png", "homepage": "https://m.example", "baseUrl": "https://m.example/maven/" }
        ]"#;
        let mirrors: Vec<Mirror> = serde_json::from_str(json).unwrap();
        assert_eq!(mirrors[0].url, "https://m.example/maven/");
        assert_eq!(mirrors[0].image.as_deref(), Some("https://m.example/logo.png"));
        assert_eq!(
            mirrors[0].sponsor_message(),
            "Data kindly mirrored by Example at https://m.example"
        );
        assert_eq!(mirrors[0].url_for("a/b.jar"), "https://m.example/maven/a/b.jar");
    }

    #[tokio::test]
    async fn forced_mirror_wins_without_network() {
        let settings = crate::core::settings::InstallerSettings {
            offline: true,
            ..Default::default()
        };
        let downloader = Downloader::new(&settings).unwrap();
        let selector = MirrorSelector::new(
            Some("https://forced.example/".into()),
            Some("https://list.example/mirrors.json".into()),
        );

        let mirror = selector.mirror(&downloader).await.unwrap();
        assert_eq!(mirror.url, "https://forced.example/");
    }

    #[tokio::test]
    async fn failed_list_means_no_mirror() {
        let settings = crate::core::settings::InstallerSettings {
            offline: true,
            ..Default::default()
        };
        let downloader = Downloader::new(&settings).unwrap();
        let selector = MirrorSelector::new(None, Some("https://list.example/mirrors.json".into()));

        assert!(selector.mirror(&downloader).await.is_none());
        assert!(MirrorSelector::none().mirror(&downloader).await.is_none());
    }
}
