use super::load_config;
use crate::cli::args::JobsArgs;
use crate::exit_codes;

pub fn run(args: JobsArgs) -> anyhow::Result<i32> {
    let config = load_config(args.config.as_deref())?;
    for name in config.job_names() {
        println!("{name}");
    }
    Ok(exit_codes::SUCCESS)
}
