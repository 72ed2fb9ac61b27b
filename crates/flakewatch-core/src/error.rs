//! Error types for the flake engine.
//!
//! Build-level failures (`SuiteError`) are absorbed by the analyzer. Job-level
//! failures (`JobError`) abort one job's pass and are reported by the caller.
//! Cache failures (`StoreError`) never escape [`crate::store::HistoryStore`]'s
//! public load/save.

use std::path::PathBuf;

use flakewatch_artifacts::ArtifactError;

/// Failure to obtain a usable test suite for one build.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// Report directory or file unreachable or absent.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The report was fetched but does not conform to the JUnit schema.
    #[error("malformed test report {url}: {message}")]
    Parse { url: String, message: String },
}

/// Failure to list a job's builds.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to list builds of {job}: {source}")]
    Listing {
        job: String,
        #[source]
        source: ArtifactError,
    },
}

/// Failure of the analysis pass for a job.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("no finished builds found for {job}")]
    NoBuilds { job: String },

    #[error("none of the {skipped} selected builds of {job} had a usable test report")]
    NoUsableBuilds { job: String, skipped: usize },
}

/// Anything that aborts one job's run.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

/// History cache failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cache io error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to encode history: {message}")]
    Encode { message: String },

    #[error("failed to decode history: {message}")]
    Decode { message: String },

    #[error("not a history cache file")]
    BadMagic,

    #[error("unsupported cache schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("cache belongs to job {found}, expected {expected}")]
    JobMismatch { found: String, expected: String },

    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
