use flakewatch_artifacts::ArtifactClient;
use flakewatch_core::report::{console, json};
use flakewatch_core::{run_job, FlakeReport};
use tracing::{error, info};

use super::{load_config, open_store};
use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::exit_codes;

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<i32> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(window) = args.window {
        config.build_window_size = window;
    }
    if let Some(dir) = args.cache_dir {
        config.cache_dir = Some(dir);
    }
    config.validate()?;

    let store = open_store(config.cache_dir.clone())?;
    let client = ArtifactClient::new(config.artifacts.clone())?;
    let job_names = if args.jobs.is_empty() {
        config.job_names()
    } else {
        args.jobs
    };

    let mut reports = Vec::with_capacity(job_names.len());
    let mut failed = 0usize;
    for name in &job_names {
        match run_job(&client, &store, &config, name, args.refresh).await {
            Ok(run) => {
                if run.from_cache {
                    info!(job = %name, "served from cache");
                } else if run.builds_skipped > 0 {
                    info!(
                        job = %name,
                        skipped = run.builds_skipped,
                        "some builds had no usable report"
                    );
                }
                let report = FlakeReport::from_history(run.job.name, &run.job.history);
                if args.format == OutputFormat::Text {
                    console::print_report(&report);
                }
                reports.push(report);
            }
            Err(e) => {
                error!(job = %name, error = %e, "job analysis failed");
                failed += 1;
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", json::to_json(&reports)?);
    }

    if failed > 0 {
        error!(failed, total = job_names.len(), "some jobs could not be analyzed");
        return Ok(exit_codes::JOB_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}
