//! The artifact-source seam.

use async_trait::async_trait;

use crate::error::ArtifactResult;
use crate::listing::ListingPattern;

/// Read-only access to an artifact store.
///
/// [`crate::ArtifactClient`] is the HTTP implementation. Anything that can
/// hand out bytes by URL (fixtures, a local mirror) can stand in for it.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch the raw bytes at `url`.
    async fn fetch_bytes(&self, url: &str) -> ArtifactResult<Vec<u8>>;

    /// Fetch the listing page at `url` and return every match of `pattern`.
    ///
    /// Fails with `NotFound` when the page has no match.
    async fn scrape_listing(&self, url: &str, pattern: &ListingPattern)
        -> ArtifactResult<Vec<String>>;
}
