//! HTTP layer: request execution and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};

/// HTTP backend for making requests.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
}

impl HttpBackend {
    /// GET `url` once and return the body. No retries.
    pub(crate) async fn get_bytes(&self, url: &str) -> ArtifactResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        match status {
            s if s.is_success() => {
                let body = response.bytes().await.map_err(|e| ArtifactError::Network {
                    message: format!("failed to read response body: {}", e),
                })?;
                debug!(url, bytes = body.len(), "fetched artifact");
                Ok(body.to_vec())
            }

            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(ArtifactError::not_found(url, "artifact"))
            }

            _ => Err(ArtifactError::Network {
                message: format!("HTTP {} for {}", status.as_u16(), url),
            }),
        }
    }
}
