//! Duplication metrics
//!
//! The headline number is the fraction of participating records flagged as
//! duplicate, printed with eight decimals.

use log::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DuplicationMetrics {
    /// Records that took part in duplicate grouping
    pub records: u64,
    /// Unmapped records passed through untouched
    pub unmapped: u64,
    pub duplicate_groups: u64,
    /// Records flagged as duplicate (group members minus primaries)
    pub duplicates: u64,
}

impl DuplicationMetrics {
    /// Fraction of participating records flagged as duplicate
    pub fn duplicate_fraction(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.duplicates as f64 / self.records as f64
        }
    }

    /// The value written to stdout
    pub fn fraction_line(&self) -> String {
        format!("{:.08}", self.duplicate_fraction())
    }

    pub fn log_summary(&self) {
        info!("  {} records considered", self.records);
        if self.unmapped > 0 {
            info!("  {} unmapped records passed through", self.unmapped);
        }
        info!("  {} duplicate groups", self.duplicate_groups);
        info!(
            "  {} duplicates ({:.2}%)",
            self.duplicates,
            self.duplicate_fraction() * 100.0
        );
    }
}
