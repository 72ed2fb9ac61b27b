use std::fmt::Write;

use super::FlakeReport;

const SEPARATOR: &str = "-----------------------------------------";

/// Render the text listing. Deterministic, unit-testable.
#[must_use]
pub fn format_report(report: &FlakeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SEPARATOR}");
    let _ = writeln!(
        out,
        "\n[{}] Top flaky tests (last {:.0} days, {} builds)",
        report.job, report.window_days, report.builds_analyzed
    );
    for entry in &report.entries {
        let _ = writeln!(out, "{:.2}\t{}", entry.flakiness, entry.name);
    }
    out
}

/// Print the text listing to stdout.
pub fn print_report(report: &FlakeReport) {
    print!("{}", format_report(report));
}
