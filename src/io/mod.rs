//! BAM file I/O utilities
//!
//! This module provides utilities for reading records into the duplicate
//! model and writing the marked BAM, including header handling and flag
//! modification.

use crate::marker::DuplicateMarker;
use crate::record::AlignmentRecord;
use anyhow::{Context, Result};
use log::debug;
use noodles::bam;
use noodles::bgzf::io::Writer as BgzfWriter;
use noodles::sam::alignment::io::Write as SamWrite;
use noodles::sam::header::Header as SamHeader;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Offset of the flag field in a serialized BAM record
///
/// block_size (4) + ref_id (4) + pos (4) + l_read_name (1) + mapq (1)
/// + bin (2) + n_cigar_op (2)
pub const FLAG_OFFSET: usize = 18;

/// The DUPLICATE flag bit in BAM format
pub const DUPLICATE_FLAG: u16 = 0x400;

/// Records read from the input for duplicate marking
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<AlignmentRecord>,
    /// Unmapped records skipped; they are written back untouched
    pub unmapped: u64,
}

/// Counts from writing the marked BAM
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: u64,
    pub removed: u64,
}

/// Modify the DUPLICATE flag in serialized BAM record bytes
///
/// Returns the modified flag value.
#[inline]
pub fn toggle_duplicate_flag(data: &mut [u8], is_duplicate: bool) -> Option<u16> {
    if data.len() < FLAG_OFFSET + 2 {
        return None;
    }

    let flag = u16::from_le_bytes([data[FLAG_OFFSET], data[FLAG_OFFSET + 1]]);
    let new_flag = if is_duplicate {
        flag | DUPLICATE_FLAG
    } else {
        flag & !DUPLICATE_FLAG
    };

    data[FLAG_OFFSET..FLAG_OFFSET + 2].copy_from_slice(&new_flag.to_le_bytes());

    Some(new_flag)
}

/// Read every mapped record of a coordinate-sorted BAM
pub fn load_records(input: &Path) -> Result<LoadedRecords> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    reader.read_header()?;

    let mut loaded = LoadedRecords::default();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.flags().is_unmapped() {
            loaded.unmapped += 1;
            continue;
        }
        loaded
            .records
            .push(AlignmentRecord::from_bam(&record, index as u64)?);
    }
    debug!(
        "loaded {} mapped records, skipped {} unmapped",
        loaded.records.len(),
        loaded.unmapped
    );
    Ok(loaded)
}

/// Write header to BGZF-compressed BAM file
pub fn write_header(writer: &mut BgzfWriter<File>, header: &SamHeader) -> Result<()> {
    let mut header_buf = Vec::new();
    {
        let mut writer = bam::io::Writer::from(&mut header_buf);
        writer.write_header(header)?;
    }
    writer.write_all(&header_buf)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a BAM record to raw bytes, block size included
pub fn record_to_bytes(header: &SamHeader, record: &bam::Record) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    {
        let mut writer = bam::io::Writer::from(&mut data);
        writer.write_alignment_record(header, record)?;
    }
    Ok(data)
}

/// Stream the input again, writing every record with its duplicate flag
///
/// Mapped records get the flag set or cleared from `marker`; unmapped records
/// are written as read. With `remove_duplicates` flagged records are dropped.
pub fn write_marked_bam(
    input: &Path,
    output: &Path,
    marker: &DuplicateMarker,
    remove_duplicates: bool,
) -> Result<WriteSummary> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(input)
        .with_context(|| format!("failed to reopen {}", input.display()))?;
    let header = reader.read_header()?;

    let out_file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut bgzf_writer = BgzfWriter::new(out_file);
    write_header(&mut bgzf_writer, &header)?;

    let mut summary = WriteSummary::default();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let mut data = record_to_bytes(&header, &record)?;

        if !record.flags().is_unmapped() {
            let is_dup = marker.is_duplicate(idx as u64);
            if is_dup && remove_duplicates {
                summary.removed += 1;
                continue;
            }
            toggle_duplicate_flag(&mut data, is_dup);
        }

        bgzf_writer.write_all(&data)?;
        summary.written += 1;
    }
    bgzf_writer.finish()?;

    Ok(summary)
}
