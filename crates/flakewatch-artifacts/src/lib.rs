//! Client for CI artifact stores.
//!
//! The artifact store is a plain HTTP file server that publishes, per job,
//! one directory per build and an HTML listing page per directory. This
//! crate provides:
//!
//! - [`ArtifactClient`]: async HTTP fetches of raw artifacts
//! - [`ListingPattern`]: extraction of entry names from listing pages
//! - [`ArtifactSource`]: the seam the analysis engine depends on, so that
//!   engine tests can run against in-memory artifacts
//!
//! No retries and no caching happen at this layer.
//!
//! # Quick Start
//!
//! ```no_run
//! use flakewatch_artifacts::{ArtifactClient, ArtifactSource, ArtifactsConfig, ListingPattern};
//!
//! # async fn example() -> Result<(), flakewatch_artifacts::ArtifactError> {
//! let client = ArtifactClient::new(ArtifactsConfig::default())?;
//! let url = format!(
//!     "{}/periodic-ci-openshift-release-master-nightly-4.10-e2e-metal-ipi/",
//!     client.base_url()
//! );
//! let builds = client.scrape_listing(&url, &ListingPattern::build_dirs()).await?;
//! println!("{} builds listed", builds.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod listing;
pub mod source;
pub mod types;

pub use client::{ArtifactClient, ARTIFACTS_USER_AGENT};
pub use error::{ArtifactError, ArtifactResult};
pub use listing::ListingPattern;
pub use source::ArtifactSource;
pub use types::{ArtifactsConfig, DEFAULT_BASE_URL};
