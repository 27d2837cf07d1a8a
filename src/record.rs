//! In-memory alignment record used for duplicate grouping
//!
//! Holds only the attributes the grouper and selector read, extracted once
//! from a BAM record during the first pass.

use crate::errors::{MarkdupError, Result};
use crate::quality::estimate_read_quality;
use bstr::BString;
use murmur3::murmur3_32;
use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::{Tag, Value};
use std::io::Cursor;

/// PacBio read quality (`rq:f`)
pub const READ_QUALITY_TAG: Tag = Tag::new(b'r', b'q');

/// PacBio number of passes (`np:i`)
pub const NUM_PASSES_TAG: Tag = Tag::new(b'n', b'p');

/// Seed for the read-name hash used as the final tie-break
pub const NAME_HASH_SEED: u32 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    /// Ordinal of the record in the input stream
    pub index: u64,
    pub name: BString,
    pub reference_id: usize,
    /// 0-based alignment start
    pub reference_start: u64,
    /// 0-based, exclusive alignment end
    pub reference_end: u64,
    /// Unclipped query length (read-consuming operations plus hard clips)
    pub query_length: u64,
    pub read_quality: Option<f64>,
    pub num_passes: Option<i64>,
    pub name_hash: u32,
    pub is_duplicate: bool,
    pub duplicate_group: Option<usize>,
}

impl AlignmentRecord {
    /// Create a record with no duplicate decision yet
    pub fn new(
        index: u64,
        name: impl Into<BString>,
        reference_id: usize,
        reference_start: u64,
        reference_end: u64,
        query_length: u64,
    ) -> Self {
        let name = name.into();
        let name_hash = hash_name(&name);
        Self {
            index,
            name,
            reference_id,
            reference_start,
            reference_end,
            query_length,
            read_quality: None,
            num_passes: None,
            name_hash,
            is_duplicate: false,
            duplicate_group: None,
        }
    }

    pub fn with_read_quality(mut self, read_quality: f64) -> Self {
        self.read_quality = Some(read_quality);
        self
    }

    pub fn with_num_passes(mut self, num_passes: i64) -> Self {
        self.num_passes = Some(num_passes);
        self
    }

    /// Extract a record from a mapped BAM alignment
    ///
    /// Read quality comes from the `rq` tag when present, otherwise it is
    /// estimated from the per-base qualities.
    pub fn from_bam(record: &bam::Record, index: u64) -> Result<Self> {
        let name: &[u8] = match record.name() {
            Some(name) => name.as_ref(),
            None => &[],
        };

        let reference_id = record.reference_sequence_id().transpose()?.ok_or_else(|| {
            MarkdupError::MissingCoordinates {
                name: String::from_utf8_lossy(name).into_owned(),
                field: "reference sequence id",
            }
        })?;
        let reference_start = record
            .alignment_start()
            .transpose()?
            .map(|p| p.get() as u64 - 1)
            .ok_or_else(|| MarkdupError::MissingCoordinates {
                name: String::from_utf8_lossy(name).into_owned(),
                field: "alignment start",
            })?;

        let mut ref_span = 0u64;
        let mut query_length = 0u64;
        for op in record.cigar().iter() {
            let op = op?;
            let len = op.len() as u64;
            if op.kind().consumes_reference() {
                ref_span += len;
            }
            if op.kind().consumes_read() || op.kind() == Kind::HardClip {
                query_length += len;
            }
        }

        let data = record.data();
        let tagged_quality = match data.get(&READ_QUALITY_TAG).transpose()? {
            Some(Value::Float(rq)) => Some(f64::from(rq)),
            _ => None,
        };
        let read_quality = match tagged_quality {
            Some(rq) => Some(rq),
            None => estimate_read_quality(record.quality_scores().as_ref()),
        };
        let num_passes = data
            .get(&NUM_PASSES_TAG)
            .transpose()?
            .and_then(|value| value_as_int(&value));

        Ok(Self {
            index,
            name: BString::from(name),
            reference_id,
            reference_start,
            reference_end: reference_start + ref_span,
            query_length,
            read_quality,
            num_passes,
            name_hash: hash_name(name),
            is_duplicate: false,
            duplicate_group: None,
        })
    }

    /// Coordinate-sort key
    #[inline]
    pub fn position(&self) -> (usize, u64) {
        (self.reference_id, self.reference_start)
    }
}

/// MurmurHash3 (x86, 32-bit) of a read name
pub fn hash_name(name: &[u8]) -> u32 {
    // reading from an in-memory cursor cannot fail
    murmur3_32(&mut Cursor::new(name), NAME_HASH_SEED).unwrap_or(0)
}

fn value_as_int(value: &Value<'_>) -> Option<i64> {
    match *value {
        Value::Int8(n) => Some(i64::from(n)),
        Value::UInt8(n) => Some(i64::from(n)),
        Value::Int16(n) => Some(i64::from(n)),
        Value::UInt16(n) => Some(i64::from(n)),
        Value::Int32(n) => Some(i64::from(n)),
        Value::UInt32(n) => Some(i64::from(n)),
        _ => None,
    }
}
