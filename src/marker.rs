//! Duplicate decisions keyed by input record ordinal
//!
//! Decouples the decision pass, which needs random access within a group,
//! from the output pass, which streams the input once more in order.

use crate::record::AlignmentRecord;
use roaring::RoaringTreemap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateMarker {
    mask: RoaringTreemap,
}

impl DuplicateMarker {
    /// Collect the ordinals of all records flagged as duplicate
    pub fn from_records(records: &[AlignmentRecord]) -> Self {
        let mask = records
            .iter()
            .filter(|r| r.is_duplicate)
            .map(|r| r.index)
            .collect();
        Self { mask }
    }

    #[inline]
    pub fn is_duplicate(&self, index: u64) -> bool {
        self.mask.contains(index)
    }

    pub fn len(&self) -> u64 {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_uses_input_ordinals() {
        // ordinals skip 2, an unmapped record that never reached the core
        let mut records = vec![
            AlignmentRecord::new(0, "a", 0, 100, 500, 400),
            AlignmentRecord::new(1, "b", 0, 100, 500, 400),
            AlignmentRecord::new(3, "c", 0, 100, 500, 400),
        ];
        records[0].is_duplicate = true;
        records[2].is_duplicate = true;

        let marker = DuplicateMarker::from_records(&records);
        assert_eq!(marker.len(), 2);
        assert!(marker.is_duplicate(0));
        assert!(!marker.is_duplicate(1));
        assert!(!marker.is_duplicate(2));
        assert!(marker.is_duplicate(3));
    }

    #[test]
    fn test_empty_marker() {
        let marker = DuplicateMarker::from_records(&[]);
        assert!(marker.is_empty());
        assert!(!marker.is_duplicate(0));
    }
}
