//! Jobs, builds, test reports and the per-job flake history.

use std::collections::{BTreeMap, BTreeSet};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Score added to a test on every observed pass/fail transition.
///
/// A full flap (pass -> fail -> pass) contributes exactly 1.0.
pub const TRANSITION_WEIGHT: f64 = 0.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Where a job's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Name of the step that runs the tests and publishes the report.
    pub test_step: String,
}

impl ArtifactLayout {
    pub fn new(base_url: impl Into<String>, test_step: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            test_step: test_step.into(),
        }
    }

    /// Listing page with one directory per build.
    pub fn job_listing_url(&self, job: &Job) -> String {
        format!("{}/{}/", self.base_url, job.name)
    }

    /// Root of a build's per-job artifacts.
    pub fn build_artifacts_url(&self, job: &Job, build_id: &str) -> String {
        format!(
            "{}/{}/{}/artifacts/{}",
            self.base_url, job.name, build_id, job.safe_name
        )
    }

    /// Completion record published by the test step once it finished.
    pub fn completion_url(&self, artifacts_url: &str) -> String {
        format!("{}/{}/finished.json", artifacts_url, self.test_step)
    }

    /// Directory holding the test step's JUnit report.
    pub fn report_dir_url(&self, build: &Build) -> String {
        format!("{}/{}/artifacts/junit/", build.artifacts_url, self.test_step)
    }
}

/// Per-build completion metadata (`finished.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub revision: String,
}

/// One finished execution of a job.
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    /// Name of the job that discovered this build.
    pub job_name: String,
    /// Origin-assigned identifier. Not guaranteed fixed-width.
    pub id: String,
    pub completion: CompletionRecord,
    pub artifacts_url: String,
}

impl Build {
    pub fn new(
        job: &Job,
        id: impl Into<String>,
        completion: CompletionRecord,
        layout: &ArtifactLayout,
    ) -> Self {
        let id = id.into();
        let artifacts_url = layout.build_artifacts_url(job, &id);
        Self {
            job_name: job.name.clone(),
            id,
            completion,
            artifacts_url,
        }
    }
}

/// A periodically scheduled test job.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    /// Suffix of the name used in per-job artifact paths.
    pub safe_name: String,
    /// Newest first. Rebuilt on every run unless history came from the cache.
    pub builds: Vec<Build>,
    pub history: History,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let safe_name = safe_name(&name).to_string();
        Self {
            name,
            safe_name,
            builds: Vec::new(),
            history: History::default(),
        }
    }
}

/// The part of a job name starting at its first `e2e`, or the whole name.
pub fn safe_name(name: &str) -> &str {
    name.find("e2e").map(|idx| &name[idx..]).unwrap_or(name)
}

/// A single test case from a build's report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestCase {
    pub name: String,
    /// `Some` when the case was skipped; carries the skip message.
    pub skipped: Option<String>,
    /// `Some` when the case failed; carries the failure message or text.
    pub failure: Option<String>,
    pub system_out: Option<String>,
}

impl TestCase {
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Skipped cases count as passed.
    pub fn is_passed(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_ignored(&self, ignore: &BTreeSet<String>) -> bool {
        ignore.contains(&self.name)
    }
}

/// The decoded test report of one build.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestSuite {
    pub name: String,
    /// Totals as declared by the report; not cross-checked against `cases`.
    pub declared_tests: u32,
    pub declared_skipped: u32,
    pub declared_failures: u32,
    pub declared_time: f64,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn failed_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(|c| c.is_failed())
    }
}

/// Flake state of one test across the analyzed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TestTrack {
    /// Pass state in the most recently processed build.
    pub previous_passed: bool,
    /// Only ever increases, by [`TRANSITION_WEIGHT`] per transition.
    pub flake_score: f64,
}

impl TestTrack {
    /// A test never seen before is assumed to have been passing.
    pub fn seeded() -> Self {
        Self {
            previous_passed: true,
            flake_score: 0.0,
        }
    }

    /// Record one observation. Returns whether it was a transition.
    pub fn observe(&mut self, passed: bool) -> bool {
        let flipped = passed != self.previous_passed;
        if flipped {
            self.flake_score += TRANSITION_WEIGHT;
        }
        self.previous_passed = passed;
        flipped
    }
}

impl Default for TestTrack {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Accumulated flake state for one job. This is what gets cached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct History {
    /// Completion timestamp of the oldest analyzed build.
    pub from: i64,
    /// Completion timestamp of the newest analyzed build.
    pub to: i64,
    pub builds_analyzed: u32,
    pub tests: BTreeMap<String, TestTrack>,
}

impl History {
    /// `flake_score / builds_analyzed`, or 0 when nothing was analyzed.
    pub fn flakiness(&self, track: &TestTrack) -> f64 {
        if self.builds_analyzed == 0 {
            return 0.0;
        }
        track.flake_score / f64::from(self.builds_analyzed)
    }

    pub fn window_days(&self) -> f64 {
        (self.to - self.from) as f64 / SECONDS_PER_DAY
    }

    /// Tests with a non-zero score.
    pub fn flaky_tests(&self) -> impl Iterator<Item = (&String, &TestTrack)> {
        self.tests.iter().filter(|(_, t)| t.flake_score > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ArtifactLayout {
        ArtifactLayout::new("https://store.example/logs/", "baremetalds-e2e-test")
    }

    #[test]
    fn test_safe_name_starts_at_e2e() {
        assert_eq!(
            safe_name("periodic-ci-openshift-release-master-nightly-4.10-e2e-metal-ipi"),
            "e2e-metal-ipi"
        );
        assert_eq!(safe_name("nightly-unit"), "nightly-unit");
    }

    #[test]
    fn test_build_locators() {
        let job = Job::new("periodic-nightly-4.10-e2e-metal-ipi");
        let record = CompletionRecord {
            timestamp: 1,
            passed: true,
            result: "SUCCESS".to_string(),
            revision: "abc".to_string(),
        };
        let build = Build::new(&job, "1478", record, &layout());

        assert_eq!(
            layout().job_listing_url(&job),
            "https://store.example/logs/periodic-nightly-4.10-e2e-metal-ipi/"
        );
        assert_eq!(
            build.artifacts_url,
            "https://store.example/logs/periodic-nightly-4.10-e2e-metal-ipi/1478/artifacts/e2e-metal-ipi"
        );
        assert_eq!(
            layout().completion_url(&build.artifacts_url),
            format!("{}/baremetalds-e2e-test/finished.json", build.artifacts_url)
        );
        assert_eq!(
            layout().report_dir_url(&build),
            format!(
                "{}/baremetalds-e2e-test/artifacts/junit/",
                build.artifacts_url
            )
        );
        assert_eq!(build.job_name, job.name);
    }

    #[test]
    fn test_completion_record_decodes_with_defaults() {
        let record: CompletionRecord =
            serde_json::from_str(r#"{"timestamp": 1641290000}"#).unwrap();
        assert_eq!(record.timestamp, 1641290000);
        assert!(!record.passed);
        assert!(record.result.is_empty());
    }

    #[test]
    fn test_completion_record_requires_timestamp() {
        assert!(serde_json::from_str::<CompletionRecord>(r#"{"passed": true}"#).is_err());
    }

    #[test]
    fn test_skipped_case_counts_as_passed() {
        let case = TestCase {
            name: "t".to_string(),
            skipped: Some("not applicable".to_string()),
            ..Default::default()
        };
        assert!(case.is_skipped());
        assert!(case.is_passed());

        let failed = TestCase {
            name: "t".to_string(),
            failure: Some(String::new()),
            ..Default::default()
        };
        assert!(failed.is_failed());
        assert!(!failed.is_passed());
    }

    #[test]
    fn test_track_full_flap_scores_one() {
        let mut track = TestTrack::seeded();
        assert!(!track.observe(true));
        assert!(track.observe(false));
        assert!(track.observe(true));
        assert_eq!(track.flake_score, 1.0);
        assert!(track.previous_passed);
    }

    #[test]
    fn test_history_flakiness_and_window() {
        let mut history = History {
            from: 0,
            to: 3 * 86_400,
            builds_analyzed: 5,
            ..Default::default()
        };
        let track = TestTrack {
            previous_passed: false,
            flake_score: 1.5,
        };
        history.tests.insert("T".to_string(), track);
        history.tests.insert("stable".to_string(), TestTrack::seeded());

        assert!((history.flakiness(&track) - 0.3).abs() < 1e-9);
        assert_eq!(history.window_days(), 3.0);
        assert_eq!(history.flaky_tests().count(), 1);
    }

    #[test]
    fn test_flakiness_without_builds_is_zero() {
        let history = History::default();
        assert_eq!(history.flakiness(&TestTrack::seeded()), 0.0);
    }
}
