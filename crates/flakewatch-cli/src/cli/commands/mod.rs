use std::path::{Path, PathBuf};

use flakewatch_core::{FlakeConfig, HistoryStore};

use super::args::*;

pub mod analyze;
pub mod cache;
pub mod jobs;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Analyze(args) => analyze::run(args).await,
        Command::Cache(args) => cache::run(args).await,
        Command::Jobs(args) => jobs::run(args),
    }
}

/// Config file (or defaults) with `FLAKEWATCH_*` overrides applied.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<FlakeConfig> {
    let mut config = match path {
        Some(path) => FlakeConfig::load(path)?,
        None => FlakeConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

pub(crate) fn open_store(cache_dir: Option<PathBuf>) -> anyhow::Result<HistoryStore> {
    Ok(match cache_dir {
        Some(dir) => HistoryStore::with_dir(dir),
        None => HistoryStore::new()?,
    })
}
