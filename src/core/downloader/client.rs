use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::checksum::same_digest;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::build_http_client;
use crate::core::settings::InstallerSettings;

/// Sequential, SHA-1 validated downloader.
///
/// Redirects are followed by hand: at most `max_redirects` hops, after
/// which the chain is rejected rather than followed further.
pub struct Downloader {
    client: Client,
    offline: bool,
    max_redirects: u32,
}

impl Downloader {
    pub fn new(settings: &InstallerSettings) -> InstallerResult<Self> {
        Ok(Self::with_client(build_http_client(settings)?, settings))
    }

    pub fn with_client(client: Client, settings: &InstallerSettings) -> Self {
        Self {
            client,
            offline: settings.offline,
            max_redirects: settings.max_redirects,
        }
    }

    // ── Connection ──────────────────────────────────────

    /// Open `url`, following up to `max_redirects` 3xx responses.
    ///
    /// Every hop counts against the bound, whatever the scheme, and only
    /// http(s) targets are ever requested.
    async fn connect(&self, url: &str) -> InstallerResult<Response> {
        if self.offline {
            info!("Offline Mode: Not downloading: {}", url);
            return Err(InstallerError::Offline(url.to_string()));
        }

        let mut current = Url::parse(url).map_err(|_| InstallerError::InvalidUrl(url.to_string()))?;

        for hop in 0..=self.max_redirects {
            if !matches!(current.scheme(), "http" | "https") {
                return Err(InstallerError::InvalidUrl(current.to_string()));
            }

            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                else {
                    return Err(InstallerError::DownloadFailed {
                        url: current.to_string(),
                        status: status.as_u16(),
                    });
                };

                let next = current
                    .join(location)
                    .map_err(|_| InstallerError::InvalidUrl(location.to_string()))?;

                if hop == self.max_redirects {
                    warn!("Invalid number of redirects: {}", next);
                    return Err(InstallerError::TooManyRedirects {
                        url: url.to_string(),
                    });
                }

                debug!("Following redirect: {}", next);
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(InstallerError::DownloadFailed {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }

        Err(InstallerError::TooManyRedirects {
            url: url.to_string(),
        })
    }

    // ── Single file download ────────────────────────────

    /// Download `url` to `dest`, optionally validating SHA-1.
    ///
    /// The body is streamed straight to `dest` while hashing. On a
    /// checksum mismatch the written file is deleted again.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> InstallerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallerError::io(parent, e))?;
        }

        let response = self.connect(url).await?;
        let mut hasher = Sha1::new();

        // Write inside a block so the handle is dropped before any delete.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| InstallerError::io(dest, e))?;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                file.write_all(&chunk)
                    .await
                    .map_err(|e| InstallerError::io(dest, e))?;
            }
            file.flush().await.map_err(|e| InstallerError::io(dest, e))?;
        }

        if let Some(expected) = sha1_expected.filter(|e| !e.is_empty()) {
            let actual = hex::encode(hasher.finalize());
            if !same_digest(expected, &actual) {
                if tokio::fs::remove_file(dest).await.is_err() {
                    return Err(InstallerError::DeleteFailed(dest.to_path_buf()));
                }
                return Err(InstallerError::ChecksumMismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Fetch and deserialize a JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> InstallerResult<T> {
        let bytes = self.connect(url).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
