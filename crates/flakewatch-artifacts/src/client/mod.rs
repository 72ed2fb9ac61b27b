//! Artifact client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};
use crate::listing::ListingPattern;
use crate::source::ArtifactSource;
use crate::types::ArtifactsConfig;

mod http;

use http::HttpBackend;

/// User agent sent with every request.
pub const ARTIFACTS_USER_AGENT: &str = concat!("flakewatch/", env!("CARGO_PKG_VERSION"));

/// HTTP client for an artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactClient {
    http: HttpBackend,
    base_url: String,
}

impl ArtifactClient {
    pub fn new(config: ArtifactsConfig) -> ArtifactResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(ARTIFACTS_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ArtifactError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend { client },
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch `url` and decode it as text. Invalid UTF-8 is replaced, never fatal.
    pub async fn fetch_text(&self, url: &str) -> ArtifactResult<String> {
        let bytes = self.http.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl ArtifactSource for ArtifactClient {
    async fn fetch_bytes(&self, url: &str) -> ArtifactResult<Vec<u8>> {
        debug!(url = %url, "fetching artifact");
        self.http.get_bytes(url).await
    }

    async fn scrape_listing(
        &self,
        url: &str,
        pattern: &ListingPattern,
    ) -> ArtifactResult<Vec<String>> {
        debug!(url = %url, pattern = pattern.as_str(), "scraping listing");

        let page = self.fetch_text(url).await?;
        let matches = pattern.extract(&page);
        if matches.is_empty() {
            return Err(ArtifactError::not_found(url, "matching listing entry"));
        }

        debug!(url = %url, count = matches.len(), "listing scraped");
        Ok(matches)
    }
}
