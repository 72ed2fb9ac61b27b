//! Per-job run: cache lookup, discovery, analysis, persistence.

use flakewatch_artifacts::ArtifactSource;
use tracing::info;

use crate::analyzer::FlakeAnalyzer;
use crate::catalog::BuildCatalog;
use crate::config::FlakeConfig;
use crate::error::JobError;
use crate::model::Job;
use crate::store::HistoryStore;

/// A completed run for one job.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub job: Job,
    /// The history was loaded from the cache; nothing was fetched.
    pub from_cache: bool,
    pub builds_skipped: usize,
}

/// Produce the history of `job_name`.
///
/// Unless `refresh` is set, a usable cached history is returned as is and no
/// request is made. Otherwise builds are discovered and analyzed from scratch
/// and the resulting history is cached. A failed pass caches nothing.
pub async fn run_job(
    source: &dyn ArtifactSource,
    store: &HistoryStore,
    config: &FlakeConfig,
    job_name: &str,
    refresh: bool,
) -> Result<JobRun, JobError> {
    let mut job = Job::new(job_name);

    if !refresh && store.load(&mut job).await {
        return Ok(JobRun {
            job,
            from_cache: true,
            builds_skipped: 0,
        });
    }

    let layout = config.layout();
    let catalog = BuildCatalog::new(source, &layout, config.build_order);
    job.builds = catalog
        .discover_builds(&job, config.build_window_size)
        .await?;

    let analyzer = FlakeAnalyzer::new(source, &layout, &config.ignored_test_names);
    let outcome = analyzer.analyze(&job).await?;
    job.history = outcome.history;

    info!(job = %job.name, "saving history");
    store.save(&job).await;

    Ok(JobRun {
        job,
        from_cache: false,
        builds_skipped: outcome.builds_skipped,
    })
}
