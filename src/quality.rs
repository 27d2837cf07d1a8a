//! Read quality estimation from per-base phred scores
//!
//! Used when a record carries no `rq` tag. The score is derived from the mean
//! phred value, not the mean error probability, so it is only comparable with
//! other scores computed the same way.

/// Phred value BAM uses to fill a missing QUAL field
pub const MISSING_QUALITY: u8 = 0xff;

/// Estimate a read quality in [0, 1) from per-base phred scores
///
/// Computes `1 - 10^(mean / -10)` over the arithmetic mean of the scores.
/// Returns `None` for an empty array or a missing (0xFF-filled) QUAL field.
pub fn estimate_read_quality(scores: &[u8]) -> Option<f64> {
    if scores.is_empty() || scores.iter().all(|&q| q == MISSING_QUALITY) {
        return None;
    }
    let sum: u64 = scores.iter().map(|&q| u64::from(q)).sum();
    let mean = sum as f64 / scores.len() as f64;
    Some(1.0 - 10f64.powf(mean / -10.0))
}
