//! Adjacent-record duplicate grouping
//!
//! Records are compared only with their immediate predecessor in coordinate
//! order. A group is therefore a chain of pairwise matches: the first and last
//! members of a long chain may be further apart than the wiggle allows.

use crate::errors::{MarkdupError, Result};
use crate::record::AlignmentRecord;
use std::ops::Range;

pub const DEFAULT_ALN_WIGGLE: u32 = 2;
pub const DEFAULT_LEN_WIGGLE: u32 = 10;

/// Slack allowed when deciding two alignments come from the same fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WiggleConfig {
    /// Maximum bp difference at each alignment end
    pub aln_wiggle: u32,
    /// Maximum query length difference, in percent of the current read length
    pub len_wiggle: u32,
}

impl Default for WiggleConfig {
    fn default() -> Self {
        Self {
            aln_wiggle: DEFAULT_ALN_WIGGLE,
            len_wiggle: DEFAULT_LEN_WIGGLE,
        }
    }
}

impl WiggleConfig {
    /// Whether `current` is a duplicate of the record right before it
    #[inline]
    pub fn matches(&self, previous: &AlignmentRecord, current: &AlignmentRecord) -> bool {
        let aln_wiggle = u64::from(self.aln_wiggle);
        previous.reference_id == current.reference_id
            && previous.reference_start.abs_diff(current.reference_start) <= aln_wiggle
            && current.reference_end.abs_diff(previous.reference_end) <= aln_wiggle
            && previous.query_length.abs_diff(current.query_length) * 100
                <= u64::from(self.len_wiggle) * current.query_length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    NotInBlock,
    InBlock,
}

/// A run of consecutive records sharing a group id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub id: usize,
    pub members: Range<usize>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Reject input that is not ordered by (reference id, reference start)
pub fn check_sort_order(records: &[AlignmentRecord]) -> Result<()> {
    for pair in records.windows(2) {
        if pair[1].position() < pair[0].position() {
            return Err(MarkdupError::UnsortedInput {
                index: pair[1].index,
                previous: pair[0].position(),
                current: pair[1].position(),
            });
        }
    }
    Ok(())
}

/// Assign group ids to runs of adjacent matching records
///
/// Every record in a run is provisionally marked duplicate. Group ids start
/// at zero for this slice. A run still open at the end of the slice is closed
/// so that it is selected like any other group.
pub fn assign_groups(records: &mut [AlignmentRecord], config: &WiggleConfig) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();
    let mut state = BlockState::NotInBlock;
    let mut group_id = 0;
    let mut block_start = 0;

    for i in 1..records.len() {
        let is_match = config.matches(&records[i - 1], &records[i]);
        state = match (state, is_match) {
            (BlockState::NotInBlock, true) => {
                block_start = i - 1;
                mark(&mut records[i - 1], group_id);
                mark(&mut records[i], group_id);
                BlockState::InBlock
            }
            (BlockState::InBlock, true) => {
                mark(&mut records[i], group_id);
                BlockState::InBlock
            }
            (BlockState::InBlock, false) => {
                groups.push(DuplicateGroup {
                    id: group_id,
                    members: block_start..i,
                });
                group_id += 1;
                BlockState::NotInBlock
            }
            (BlockState::NotInBlock, false) => BlockState::NotInBlock,
        };
    }

    if state == BlockState::InBlock {
        groups.push(DuplicateGroup {
            id: group_id,
            members: block_start..records.len(),
        });
    }

    groups
}

#[inline]
fn mark(record: &mut AlignmentRecord, group_id: usize) {
    record.is_duplicate = true;
    record.duplicate_group = Some(group_id);
}
