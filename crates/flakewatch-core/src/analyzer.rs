//! Flake detection: folds build reports into a job's [`History`].

use std::collections::BTreeSet;

use flakewatch_artifacts::ArtifactSource;
use tracing::{debug, info, warn};

use crate::error::{AnalyzeError, AnalyzeResult};
use crate::junit::TestResultParser;
use crate::model::{ArtifactLayout, History, Job, TestSuite};

/// Result of one analysis pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub history: History,
    /// Builds whose report could not be fetched or decoded.
    pub builds_skipped: usize,
}

/// Walks a job's builds and accumulates per-test transitions.
pub struct FlakeAnalyzer<'a> {
    parser: TestResultParser<'a>,
    ignore: &'a BTreeSet<String>,
}

impl<'a> FlakeAnalyzer<'a> {
    pub fn new(
        source: &'a dyn ArtifactSource,
        layout: &'a ArtifactLayout,
        ignore: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            parser: TestResultParser::new(source, layout),
            ignore,
        }
    }

    /// Analyze `job.builds` (newest first) into a fresh history.
    ///
    /// A build whose report is unavailable or malformed is skipped and counts
    /// toward neither `builds_analyzed` nor any transition. The window always
    /// spans the first and last listed builds.
    pub async fn analyze(&self, job: &Job) -> AnalyzeResult<AnalysisOutcome> {
        let (Some(newest), Some(oldest)) = (job.builds.first(), job.builds.last()) else {
            return Err(AnalyzeError::NoBuilds {
                job: job.name.clone(),
            });
        };

        info!(
            job = %job.name,
            "parsing tests for builds [{}, {}]",
            newest.id,
            oldest.id
        );

        let mut history = History::default();
        let mut builds_skipped = 0;

        for build in &job.builds {
            match self.parser.fetch_suite(build).await {
                Ok(suite) => {
                    debug!(
                        job = %job.name,
                        build = %build.id,
                        cases = suite.cases.len(),
                        failed = suite.failed_cases().count(),
                        "folding test report"
                    );
                    Self::fold(&mut history, &suite, self.ignore);
                }
                Err(e) => {
                    warn!(job = %job.name, build = %build.id, error = %e, "skipping build");
                    builds_skipped += 1;
                }
            }
        }

        if history.builds_analyzed == 0 {
            return Err(AnalyzeError::NoUsableBuilds {
                job: job.name.clone(),
                skipped: builds_skipped,
            });
        }

        history.to = newest.completion.timestamp;
        history.from = oldest.completion.timestamp;

        info!(
            job = %job.name,
            analyzed = history.builds_analyzed,
            skipped = builds_skipped,
            flaky = history.flaky_tests().count(),
            "analysis complete"
        );

        Ok(AnalysisOutcome {
            history,
            builds_skipped,
        })
    }

    /// Fold one already-fetched suite into `history`.
    ///
    /// This is the only place a history is mutated during analysis.
    pub fn fold(history: &mut History, suite: &TestSuite, ignore: &BTreeSet<String>) {
        for case in suite.cases.iter().filter(|c| !c.is_ignored(ignore)) {
            history
                .tests
                .entry(case.name.clone())
                .or_default()
                .observe(case.is_passed());
        }
        history.builds_analyzed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestCase, TestTrack};
    use proptest::prelude::*;

    fn case(name: &str, passed: bool) -> TestCase {
        TestCase {
            name: name.to_string(),
            failure: (!passed).then(|| "failed".to_string()),
            ..Default::default()
        }
    }

    fn suite(cases: Vec<TestCase>) -> TestSuite {
        TestSuite {
            name: "openshift-tests".to_string(),
            cases,
            ..Default::default()
        }
    }

    fn fold_all(suites: &[TestSuite], ignore: &BTreeSet<String>) -> History {
        let mut history = History::default();
        for s in suites {
            FlakeAnalyzer::fold(&mut history, s, ignore);
        }
        history
    }

    #[test]
    fn test_worked_example_scores_one_and_a_half() {
        let suites: Vec<_> = [true, false, true, true, false]
            .into_iter()
            .map(|passed| suite(vec![case("T", passed)]))
            .collect();

        let history = fold_all(&suites, &BTreeSet::new());
        let track = history.tests["T"];

        assert_eq!(history.builds_analyzed, 5);
        assert_eq!(track.flake_score, 1.5);
        assert!(!track.previous_passed);
        assert!((history.flakiness(&track) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_ignored_tests_leave_no_trace() {
        let ignore: BTreeSet<String> = ["monitor".to_string()].into_iter().collect();
        let suites = vec![
            suite(vec![case("monitor", false), case("a", true)]),
            suite(vec![case("monitor", true), case("a", true)]),
            suite(vec![case("monitor", false), case("a", true)]),
        ];

        let history = fold_all(&suites, &ignore);

        assert!(!history.tests.contains_key("monitor"));
        assert_eq!(history.tests["a"], TestTrack::seeded());
        assert_eq!(history.builds_analyzed, 3);
    }

    #[test]
    fn test_skipped_case_counts_as_pass() {
        let skipped = TestCase {
            name: "T".to_string(),
            skipped: Some("not on this platform".to_string()),
            ..Default::default()
        };
        let suites = vec![suite(vec![case("T", false)]), suite(vec![skipped])];

        let history = fold_all(&suites, &BTreeSet::new());
        assert_eq!(history.tests["T"].flake_score, 1.0);
        assert!(history.tests["T"].previous_passed);
    }

    #[test]
    fn test_test_absent_from_some_builds_keeps_its_state() {
        let suites = vec![
            suite(vec![case("T", false)]),
            suite(vec![case("other", true)]),
            suite(vec![case("T", false)]),
        ];

        let history = fold_all(&suites, &BTreeSet::new());
        assert_eq!(history.tests["T"].flake_score, 0.5);
        assert_eq!(history.builds_analyzed, 3);
    }

    proptest! {
        #[test]
        fn prop_score_counts_adjacent_differences(states in prop::collection::vec(any::<bool>(), 0..64)) {
            let suites: Vec<_> = states.iter().map(|&p| suite(vec![case("T", p)])).collect();
            let history = fold_all(&suites, &BTreeSet::new());

            let mut previous = true;
            let mut flips = 0u32;
            for &p in &states {
                if p != previous {
                    flips += 1;
                }
                previous = p;
            }

            let score = history.tests.get("T").map(|t| t.flake_score).unwrap_or(0.0);
            prop_assert_eq!(score, 0.5 * f64::from(flips));
            prop_assert_eq!(history.builds_analyzed as usize, states.len());
        }

        #[test]
        fn prop_fold_is_deterministic(
            runs in prop::collection::vec(prop::collection::vec((0usize..4, any::<bool>()), 0..6), 0..12)
        ) {
            let names = ["a", "b", "c", "[sig-arch] Monitor cluster while tests execute"];
            let ignore: BTreeSet<String> = [names[3].to_string()].into_iter().collect();
            let suites: Vec<_> = runs
                .iter()
                .map(|cases| suite(cases.iter().map(|&(i, p)| case(names[i], p)).collect()))
                .collect();

            let first = fold_all(&suites, &ignore);
            let second = fold_all(&suites, &ignore);

            prop_assert_eq!(&first, &second);
            prop_assert!(!first.tests.contains_key(names[3]));
        }
    }
}
