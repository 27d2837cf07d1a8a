//! Two-pass duplicate marking of a BAM file
//!
//! Pass one loads every mapped record and decides duplicates; pass two
//! streams the input again and writes the flags.

use crate::algorithm::mark_duplicates;
use crate::args::{Args, effective_threads};
use crate::io::{load_records, write_marked_bam};
use crate::marker::DuplicateMarker;
use crate::metrics::DuplicationMetrics;
use crate::utils::format_duration_verbose;
use anyhow::Result;
use log::info;
use std::time::Instant;

pub fn run_markdup(args: &Args) -> Result<DuplicationMetrics> {
    args.validate()?;
    let threads = effective_threads(args);
    let total_start = Instant::now();

    info!("finding duplicate alignments in {}...", args.input.display());
    let find_start = Instant::now();
    let mut loaded = load_records(&args.input)?;
    let mut metrics = mark_duplicates(&mut loaded.records, &args.wiggle_config(), threads)?;
    metrics.unmapped = loaded.unmapped;
    let marker = DuplicateMarker::from_records(&loaded.records);
    info!(
        "collected duplicates in {}",
        format_duration_verbose(find_start.elapsed())
    );
    metrics.log_summary();

    // release the record arena before the second pass
    drop(loaded);

    if let Some(output) = &args.output {
        info!("marking duplicates...");
        let write_start = Instant::now();
        let summary = write_marked_bam(&args.input, output, &marker, args.remove_duplicates)?;
        info!(
            "wrote {} records to {} in {}",
            summary.written,
            output.display(),
            format_duration_verbose(write_start.elapsed())
        );
        if args.remove_duplicates {
            info!("  removed {} duplicates", summary.removed);
        }
    }

    info!("done in {}", format_duration_verbose(total_start.elapsed()));

    Ok(metrics)
}
