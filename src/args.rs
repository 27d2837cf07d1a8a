// Command-line argument parsing
use crate::errors::{MarkdupError, Result};
use crate::grouper::{DEFAULT_ALN_WIGGLE, DEFAULT_LEN_WIGGLE, WiggleConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lrmarkdup",
    about = "Mark PCR duplicates in coordinate-sorted long-read BAMs"
)]
pub struct Args {
    /// Coordinate-sorted input BAM
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output BAM; only the duplicate fraction is reported when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Maximum bp difference allowed at each alignment end
    #[arg(short = 'w', long, visible_alias = "wiggle", default_value_t = DEFAULT_ALN_WIGGLE)]
    pub aln_wiggle: u32,
    /// Maximum query length difference, in percent
    #[arg(short = 'l', long, default_value_t = DEFAULT_LEN_WIGGLE)]
    pub len_wiggle: u32,
    /// Drop duplicates from the output instead of flagging them
    #[arg(short = 'r', long)]
    pub remove_duplicates: bool,
    #[arg(short = 't', long, default_value_t = num_cpus())]
    pub threads: usize,
    /// Force single-threaded mode
    #[arg(long)]
    pub single_threaded: bool,
}

impl Args {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(MarkdupError::InvalidParameter {
                parameter: "threads".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        if self.remove_duplicates && self.output.is_none() {
            return Err(MarkdupError::InvalidParameter {
                parameter: "remove-duplicates".to_string(),
                reason: "requires --output".to_string(),
            });
        }
        Ok(())
    }

    pub fn wiggle_config(&self) -> WiggleConfig {
        WiggleConfig {
            aln_wiggle: self.aln_wiggle,
            len_wiggle: self.len_wiggle,
        }
    }
}

pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Get effective thread count based on args and platform
#[inline]
pub fn effective_threads(args: &Args) -> usize {
    if args.single_threaded {
        1
    } else {
        args.threads
    }
}
