use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flakewatch",
    version,
    about = "Find flaky tests in the recent build history of CI jobs"
)]
pub struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze jobs and print their top flaky tests
    Analyze(AnalyzeArgs),
    /// Manage cached job histories
    Cache(CacheArgs),
    /// Print the job names the configuration expands to
    Jobs(JobsArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(long, short = 'c', env = "FLAKEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Analyze only these jobs instead of the configured ones
    #[arg(long = "job", value_name = "NAME")]
    pub jobs: Vec<String>,

    /// Number of finished builds sampled per job
    #[arg(long)]
    pub window: Option<usize>,

    /// Ignore cached histories and re-analyze
    #[arg(long)]
    pub refresh: bool,

    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub cmd: CacheSub,

    /// Configuration whose `cache_dir` is managed
    #[arg(long, short = 'c', env = "FLAKEWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CacheSub {
    /// List jobs with a cached history
    List,
    /// Remove every cached history
    Clear,
    /// Remove the cached history of one job
    Evict {
        /// Job name
        job: String,
    },
}

#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[arg(long, short = 'c', env = "FLAKEWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}
