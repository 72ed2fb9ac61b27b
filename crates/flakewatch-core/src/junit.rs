//! JUnit report location and decoding.

use flakewatch_artifacts::{ArtifactError, ArtifactSource, ListingPattern};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tracing::debug;

use crate::error::SuiteError;
use crate::model::{ArtifactLayout, Build, TestCase, TestSuite};

/// Locates and decodes the JUnit report of a build.
pub struct TestResultParser<'a> {
    source: &'a dyn ArtifactSource,
    layout: &'a ArtifactLayout,
}

impl<'a> TestResultParser<'a> {
    pub fn new(source: &'a dyn ArtifactSource, layout: &'a ArtifactLayout) -> Self {
        Self { source, layout }
    }

    /// The report file name carries a timestamp, so it is scraped from the
    /// report directory's listing rather than constructed.
    pub async fn fetch_suite(&self, build: &Build) -> Result<TestSuite, SuiteError> {
        let dir_url = self.layout.report_dir_url(build);
        let files = self
            .source
            .scrape_listing(&dir_url, &ListingPattern::junit_reports())
            .await?;
        let file = files
            .first()
            .ok_or_else(|| ArtifactError::not_found(dir_url.as_str(), "junit report"))?;
        let report_url = format!("{dir_url}{file}");

        debug!(build = %build.id, url = %report_url, "fetching test report");
        let bytes = self.source.fetch_bytes(&report_url).await?;
        let xml = std::str::from_utf8(&bytes).map_err(|e| SuiteError::Parse {
            url: report_url.clone(),
            message: format!("report is not UTF-8: {e}"),
        })?;

        parse_report(xml).map_err(|message| SuiteError::Parse {
            url: report_url,
            message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct XmlSuites {
    #[serde(rename = "testsuite", default)]
    suites: Vec<XmlSuite>,
}

#[derive(Debug, Deserialize)]
struct XmlSuite {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@tests", default)]
    tests: u32,
    #[serde(rename = "@skipped", default)]
    skipped: u32,
    #[serde(rename = "@failures", default)]
    failures: u32,
    #[serde(rename = "@time", default)]
    time: f64,
    #[serde(rename = "testcase", default)]
    cases: Vec<XmlCase>,
}

#[derive(Debug, Deserialize)]
struct XmlCase {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default)]
    skipped: Option<XmlSkipped>,
    #[serde(default)]
    failure: Option<XmlFailure>,
    #[serde(rename = "system-out", default)]
    system_out: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlSkipped {
    #[serde(rename = "@message", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct XmlFailure {
    #[serde(rename = "@message", default)]
    message: String,
    #[serde(rename = "$text", default)]
    text: String,
}

impl From<XmlCase> for TestCase {
    fn from(case: XmlCase) -> Self {
        let failure = case.failure.map(|f| {
            if f.text.trim().is_empty() {
                f.message
            } else {
                f.text
            }
        });
        TestCase {
            name: case.name,
            skipped: case.skipped.map(|s| s.message),
            failure,
            system_out: case.system_out,
        }
    }
}

impl From<XmlSuite> for TestSuite {
    fn from(suite: XmlSuite) -> Self {
        TestSuite {
            name: suite.name,
            declared_tests: suite.tests,
            declared_skipped: suite.skipped,
            declared_failures: suite.failures,
            declared_time: suite.time,
            cases: suite.cases.into_iter().map(TestCase::from).collect(),
        }
    }
}

/// Decode a JUnit document with a `<testsuite>` or `<testsuites>` root.
///
/// Multiple suites under `<testsuites>` are merged in document order.
pub fn parse_report(xml: &str) -> Result<TestSuite, String> {
    match root_element(xml)?.as_str() {
        "testsuite" => quick_xml::de::from_str::<XmlSuite>(xml)
            .map(TestSuite::from)
            .map_err(|e| e.to_string()),
        "testsuites" => {
            let suites = quick_xml::de::from_str::<XmlSuites>(xml).map_err(|e| e.to_string())?;
            Ok(merge_suites(suites.suites))
        }
        other => Err(format!("unexpected root element <{other}>")),
    }
}

fn root_element(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err("document has no root element".to_string()),
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "invalid XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }
}

fn merge_suites(suites: Vec<XmlSuite>) -> TestSuite {
    let mut merged = TestSuite::default();
    for suite in suites {
        let suite = TestSuite::from(suite);
        if merged.name.is_empty() {
            merged.name = suite.name;
        }
        merged.declared_tests += suite.declared_tests;
        merged.declared_skipped += suite.declared_skipped;
        merged.declared_failures += suite.declared_failures;
        merged.declared_time += suite.declared_time;
        merged.cases.extend(suite.cases);
    }
    merged
}
