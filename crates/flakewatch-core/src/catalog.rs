//! Build discovery: which builds of a job get analyzed.

use std::cmp::Ordering;

use flakewatch_artifacts::{ArtifactSource, ListingPattern};
use tracing::{debug, info, warn};

use crate::config::BuildOrder;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{ArtifactLayout, Build, CompletionRecord, Job};

/// Discovers the most recent finished builds of a job.
pub struct BuildCatalog<'a> {
    source: &'a dyn ArtifactSource,
    layout: &'a ArtifactLayout,
    order: BuildOrder,
}

impl<'a> BuildCatalog<'a> {
    pub fn new(
        source: &'a dyn ArtifactSource,
        layout: &'a ArtifactLayout,
        order: BuildOrder,
    ) -> Self {
        Self {
            source,
            layout,
            order,
        }
    }

    /// Up to `window_size` finished builds, newest first.
    ///
    /// Candidates are walked from the end of the sorted identifier list
    /// backwards. A candidate without a readable completion record is still
    /// running (or broken) and is skipped. Running out of candidates yields a
    /// shorter list, never an error.
    pub async fn discover_builds(
        &self,
        job: &Job,
        window_size: usize,
    ) -> CatalogResult<Vec<Build>> {
        info!(job = %job.name, "listing builds");

        let listing_url = self.layout.job_listing_url(job);
        let mut ids = self
            .source
            .scrape_listing(&listing_url, &ListingPattern::build_dirs())
            .await
            .map_err(|source| CatalogError::Listing {
                job: job.name.clone(),
                source,
            })?;
        sort_build_ids(&mut ids, self.order);

        let mut builds = Vec::with_capacity(window_size.min(ids.len()));
        for id in ids.iter().rev() {
            if builds.len() >= window_size {
                break;
            }

            match self.fetch_completion(job, id).await {
                Some(record) => builds.push(Build::new(job, id.as_str(), record, self.layout)),
                None => debug!(job = %job.name, build = %id, "build not finished, skipping"),
            }
        }

        info!(
            job = %job.name,
            listed = ids.len(),
            selected = builds.len(),
            "found {} builds, selected last {}",
            ids.len(),
            builds.len()
        );
        Ok(builds)
    }

    async fn fetch_completion(&self, job: &Job, id: &str) -> Option<CompletionRecord> {
        let artifacts_url = self.layout.build_artifacts_url(job, id);
        let url = self.layout.completion_url(&artifacts_url);

        let bytes = match self.source.fetch_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_skippable() => {
                debug!(build = %id, error = %e, "no completion record");
                return None;
            }
            Err(e) => {
                warn!(build = %id, error = %e, "completion record fetch failed");
                return None;
            }
        };

        match serde_json::from_slice::<CompletionRecord>(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(build = %id, error = %e, "unreadable completion record");
                None
            }
        }
    }
}

/// Sort identifiers ascending under `order`; the newest is last.
pub fn sort_build_ids(ids: &mut [String], order: BuildOrder) {
    match order {
        BuildOrder::Lexical => ids.sort(),
        BuildOrder::Numeric => ids.sort_by(|a, b| compare_numeric(a, b)),
    }
}

/// Compare decimal strings by value without parsing, so arbitrarily long
/// identifiers never overflow. Leading zeros are insignificant; ties fall
/// back to the raw strings to keep the order total.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.cmp(b))
}
