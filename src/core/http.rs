use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::core::settings::InstallerSettings;

/// Redirects are followed by hand in the downloader so the hop count is
/// bounded the same way for every request.
pub fn build_http_client(settings: &InstallerSettings) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(default_headers)
        .redirect(Policy::none())
        .connect_timeout(settings.connect_timeout())
        .read_timeout(settings.read_timeout())
        .build()
}
