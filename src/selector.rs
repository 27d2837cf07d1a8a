//! Primary selection within duplicate groups
//!
//! Each group keeps exactly one non-duplicate record. Candidates are ranked by
//! a chain of keys; a key joins the chain only when every record of the run
//! carries the field it compares, so the order never depends on which reads
//! happen to have a tag.

use crate::grouper::DuplicateGroup;
use crate::record::AlignmentRecord;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    /// Higher read quality first
    ReadQuality,
    /// More passes first
    NumPasses,
    /// Smaller name hash first; always available
    NameHash,
}

impl RankKey {
    fn compare(self, a: &AlignmentRecord, b: &AlignmentRecord) -> Ordering {
        match self {
            RankKey::ReadQuality => {
                let qb = rankable_quality(b.read_quality);
                rankable_quality(a.read_quality).total_cmp(&qb).reverse()
            }
            RankKey::NumPasses => b.num_passes.cmp(&a.num_passes),
            RankKey::NameHash => a.name_hash.cmp(&b.name_hash),
        }
    }
}

/// Missing or NaN qualities rank below every real quality
#[inline]
fn rankable_quality(quality: Option<f64>) -> f64 {
    match quality {
        Some(q) if !q.is_nan() => q,
        _ => f64::NEG_INFINITY,
    }
}

/// Total order used to pick the primary of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    keys: Vec<RankKey>,
}

impl Ranking {
    /// Build the ranking from the fields available across the whole run
    pub fn for_records(records: &[AlignmentRecord]) -> Self {
        let mut keys = Vec::with_capacity(3);
        if records.iter().all(|r| r.read_quality.is_some()) {
            keys.push(RankKey::ReadQuality);
            if records.iter().all(|r| r.num_passes.is_some()) {
                keys.push(RankKey::NumPasses);
            }
        }
        keys.push(RankKey::NameHash);
        Self { keys }
    }

    pub fn keys(&self) -> &[RankKey] {
        &self.keys
    }

    /// `Less` means `a` is the better primary
    pub fn compare(&self, a: &AlignmentRecord, b: &AlignmentRecord) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Clear the duplicate flag on the best member of `group`
///
/// Exact ties keep the earliest record. Returns the index of the primary.
pub fn select_primary(
    records: &mut [AlignmentRecord],
    group: &DuplicateGroup,
    ranking: &Ranking,
) -> Option<usize> {
    let best = group
        .members
        .clone()
        .min_by(|&a, &b| ranking.compare(&records[a], &records[b]))?;
    records[best].is_duplicate = false;
    Some(best)
}

/// Select a primary for every group, returning the number of primaries
pub fn select_primaries(
    records: &mut [AlignmentRecord],
    groups: &[DuplicateGroup],
    ranking: &Ranking,
) -> usize {
    groups
        .iter()
        .filter_map(|group| select_primary(records, group, ranking))
        .count()
}
