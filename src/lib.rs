//! lrmarkdup - PCR duplicate marking for coordinate-sorted long-read BAMs
//!
//! Adjacent alignments whose ends and query lengths agree within a small
//! wiggle are grouped; in each group the read with the best quality is kept
//! and every other member is flagged as duplicate.
//!
//! # Example
//!
//! ```ignore
//! use lrmarkdup::{Args, run_markdup};
//!
//! let args = Args {
//!     input: "aligned.bam".into(),
//!     output: Some("marked.bam".into()),
//!     aln_wiggle: 2,
//!     len_wiggle: 10,
//!     remove_duplicates: false,
//!     threads: 8,
//!     single_threaded: false,
//! };
//!
//! let metrics = run_markdup(&args)?;
//! println!("{}", metrics.fraction_line());
//! ```

pub mod algorithm;
pub mod args;
pub mod errors;
pub mod grouper;
pub mod io;
pub mod marker;
pub mod metrics;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod selector;
pub mod utils;

// Re-export commonly used items
pub use algorithm::mark_duplicates;
pub use args::Args;
pub use errors::{MarkdupError, Result};
pub use grouper::{DuplicateGroup, WiggleConfig};
pub use io::{DUPLICATE_FLAG, FLAG_OFFSET, toggle_duplicate_flag};
pub use marker::DuplicateMarker;
pub use metrics::DuplicationMetrics;
pub use pipeline::run_markdup;
pub use record::AlignmentRecord;
pub use selector::Ranking;
