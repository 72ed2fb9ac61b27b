pub mod console;
pub mod json;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::History;

/// One surfaced test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakyTest {
    pub name: String,
    pub flakiness: f64,
    pub flake_score: f64,
}

/// Ranked flakiness listing for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakeReport {
    pub job: String,
    /// Unix seconds of the oldest analyzed build.
    pub from: i64,
    /// Unix seconds of the newest analyzed build.
    pub to: i64,
    pub window_days: f64,
    pub builds_analyzed: u32,
    /// Flakiness descending, then name ascending.
    pub entries: Vec<FlakyTest>,
}

impl FlakeReport {
    /// Tests with a zero score are left out.
    pub fn from_history(job: impl Into<String>, history: &History) -> Self {
        let mut entries: Vec<FlakyTest> = history
            .flaky_tests()
            .map(|(name, track)| FlakyTest {
                name: name.clone(),
                flakiness: history.flakiness(track),
                flake_score: track.flake_score,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.flakiness
                .total_cmp(&a.flakiness)
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            job: job.into(),
            from: history.from,
            to: history.to,
            window_days: history.window_days(),
            builds_analyzed: history.builds_analyzed,
            entries,
        }
    }

    pub fn from_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.from, 0)
    }

    pub fn to_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.to, 0)
    }
}
