use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use lrmarkdup::{Args, run_markdup};

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let threads = lrmarkdup::args::effective_threads(&args);
    if threads > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }
    info!(
        "lrmarkdup: using {} threads{}",
        threads,
        if args.single_threaded { " (single-threaded mode)" } else { "" }
    );

    let metrics = run_markdup(&args)?;
    println!("{}", metrics.fraction_line());

    Ok(())
}
