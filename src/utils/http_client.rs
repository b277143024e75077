use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// Fetches remote playlists with a bounded total timeout.
///
/// One request per call and no retries: any transport failure or non-success
/// status fails the fetch.
#[derive(Clone)]
pub struct PlaylistFetcher {
    client: Client,
}

impl PlaylistFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ImportConfig) -> AppResult<Self> {
        Self::new(config.fetch_timeout_duration()?, &config.user_agent)
    }

    /// Fetch a playlist body as text
    pub async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let url = url.trim();
        let display_url = UrlUtils::obfuscate_credentials(url);

        if !UrlUtils::is_http(url) {
            return Err(SourceError::invalid_config(
                "url",
                format!("playlist URL must use HTTP or HTTPS: {display_url}"),
            ));
        }

        info!("Fetching playlist from {}", display_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Failed to fetch playlist from {}: {}", display_url, e);
            if e.is_timeout() {
                SourceError::timeout(display_url.clone())
            } else {
                SourceError::request_failed(display_url.clone(), e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Playlist fetch from {} returned {}", display_url, status);
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} - URL: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    display_url
                ),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::timeout(display_url.clone())
            } else {
                SourceError::request_failed(display_url.clone(), e.to_string())
            }
        })?;

        debug!("Fetched {} bytes from {}", body.len(), display_url);
        Ok(body)
    }
}
