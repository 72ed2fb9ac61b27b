//! Flaky-test detection over CI build history.
//!
//! For each configured job the engine discovers the most recent finished
//! builds, decodes every build's JUnit report, and scores each test by how
//! often its pass/fail outcome flips between consecutive builds. The
//! resulting [`History`] is cached per job, so a repeated run is served
//! without touching the network.
//!
//! ```text
//! BuildCatalog -> TestResultParser (per build) -> FlakeAnalyzer::fold -> HistoryStore
//!                                                                     -> FlakeReport
//! ```

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod junit;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod store;

pub use analyzer::{AnalysisOutcome, FlakeAnalyzer};
pub use catalog::{sort_build_ids, BuildCatalog};
pub use config::{BuildOrder, FlakeConfig};
pub use error::{AnalyzeError, CatalogError, ConfigError, JobError, StoreError, SuiteError};
pub use junit::{parse_report, TestResultParser};
pub use model::{
    ArtifactLayout, Build, CompletionRecord, History, Job, TestCase, TestSuite, TestTrack,
    TRANSITION_WEIGHT,
};
pub use pipeline::{run_job, JobRun};
pub use report::{FlakeReport, FlakyTest};
pub use store::{HistoryStore, CACHE_SCHEMA_VERSION};
