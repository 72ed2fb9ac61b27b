use crate::report::FlakeReport;

/// Reports as a JSON document, one object per job.
pub fn to_json(reports: &[FlakeReport]) -> serde_json::Result<String> {
    let v: Vec<_> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "job": r.job,
                "from": r.from,
                "to": r.to,
                "from_time": r.from_time(),
                "to_time": r.to_time(),
                "window_days": r.window_days,
                "builds_analyzed": r.builds_analyzed,
                "entries": r.entries,
            })
        })
        .collect();
    serde_json::to_string_pretty(&v)
}
