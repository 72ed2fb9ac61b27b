use super::{load_config, open_store};
use crate::cli::args::{CacheArgs, CacheSub};
use crate::exit_codes;

pub async fn run(args: CacheArgs) -> anyhow::Result<i32> {
    let cache_dir = match args.cache_dir {
        Some(dir) => Some(dir),
        None => load_config(args.config.as_deref())?.cache_dir,
    };
    let store = open_store(cache_dir)?;

    match args.cmd {
        CacheSub::List => {
            for name in store.list().await? {
                println!("{name}");
            }
        }
        CacheSub::Clear => {
            let removed = store.clear().await?;
            eprintln!(
                "Removed {removed} cached histories from {}",
                store.cache_dir().display()
            );
        }
        CacheSub::Evict { job } => {
            if store.evict(&job).await? {
                eprintln!("Evicted {job}");
            } else {
                eprintln!("No cached history for {job}");
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}
