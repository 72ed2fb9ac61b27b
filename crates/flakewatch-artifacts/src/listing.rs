//! Directory-listing extraction.
//!
//! Listing pages are HTML rendered by the artifact store's web front. Each
//! entry is a row carrying an icon (`dir.png` or `file.png`) followed by the
//! entry's display name. The format is not versioned, so extraction is
//! pattern based and confined to this module.

use regex::Regex;

use crate::error::{ArtifactError, ArtifactResult};

const BUILD_DIRS: &str = r#"<div class="pure-u-2-5">.*<img src="/icons/dir.png"> ([0-9]+)"#;
const JUNIT_REPORTS: &str = r#"<div class="pure-u-2-5">.*<img src="/icons/file.png"> (junit_.*\.xml)"#;

/// A compiled extraction pattern with exactly one capture group of interest.
#[derive(Debug, Clone)]
pub struct ListingPattern {
    regex: Regex,
}

impl ListingPattern {
    /// Compile a custom pattern. The first capture group is extracted.
    pub fn new(pattern: &str) -> ArtifactResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| ArtifactError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        if regex.captures_len() < 2 {
            return Err(ArtifactError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern has no capture group".to_string(),
            });
        }

        Ok(Self { regex })
    }

    /// Numeric directory entries: build identifiers on a job page.
    pub fn build_dirs() -> Self {
        Self::builtin(BUILD_DIRS)
    }

    /// JUnit report files on a report directory page.
    pub fn junit_reports() -> Self {
        Self::builtin(JUNIT_REPORTS)
    }

    fn builtin(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("built-in listing pattern compiles"),
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All matches of the capture group, in document order.
    pub fn extract(&self, html: &str) -> Vec<String> {
        self.regex
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
