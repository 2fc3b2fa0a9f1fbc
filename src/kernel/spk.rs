//! NAIF DAF/SPK reader.
//!
//! Walks the summary record chain of a little-endian SPK file and decodes
//! every type 2 segment into a [`Segment`]. The `(mid, radius)` pair opening
//! each type 2 record is checked against the segment trailer and dropped, so
//! the coefficient buffer ends up in the same per-sub-interval X/Y/Z layout as
//! the native format.
//!
//! Times are TDB seconds past J2000, positions km and velocities km/s.

use std::collections::HashSet;

use log::{debug, trace};
use nom::{multi::count, number::complete::le_f64};

use crate::constants::{DAF_RECORD_SIZE, DAF_WORD_SIZE};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::kernel::daf_header::DafHeader;
use crate::kernel::directory::{Type2Directory, TYPE2_DIRECTORY_SIZE};
use crate::kernel::spk_data_type::SpkDataType;
use crate::kernel::summary_record::{SpkSummary, SummaryControl, CONTROL_SIZE};
use crate::kernel::{checked_slice, decode_error};
use crate::segment::Segment;

/// Characters used per comment record.
const COMMENT_RECORD_CHARS: usize = 1000;

/// End-of-comment marker.
const COMMENT_EOT: u8 = 0x04;

/// Decoded content of an SPK file.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkContents {
    pub header: DafHeader,
    pub comment: String,
    /// Earliest segment start.
    pub start: f64,
    /// Latest segment end.
    pub end: f64,
    pub segments: Vec<Segment>,
}

fn record_bytes<'a>(bytes: &'a [u8], record: usize, what: &str) -> Result<&'a [u8]> {
    let start = (record as u64 - 1) * DAF_RECORD_SIZE as u64;
    checked_slice(bytes, start, DAF_RECORD_SIZE as u64, what)
}

/// Decode an SPK kernel.
///
/// Arguments
/// -----------------
/// * `bytes`: The whole file, starting with the `DAF/SPK` file record.
///
/// Return
/// ----------
/// * The file record, the comment area and the type 2 segments in summary order.
///
/// Errors
/// ----------
/// * [`EphemerisError::Format`] for big-endian files or a non-SPK summary shape.
/// * [`EphemerisError::Truncated`] when a record or a segment overruns the file.
/// * [`EphemerisError::Corrupt`] for a looping summary chain, inconsistent
///   addresses, record headers disagreeing with the trailer, or no segment at all.
/// * [`EphemerisError::UnsupportedSpkType`] for segments other than type 2.
///
/// See also
/// ------------
/// * [`DafHeader::check`] – File record validation.
/// * [`Type2Directory`] – Segment trailer.
pub fn parse_spk(bytes: &[u8]) -> Result<SpkContents> {
    let file_record = record_bytes(bytes, 1, "DAF file record")?;
    let (_, header) = DafHeader::parse(file_record).map_err(decode_error("DAF file record"))?;
    header.check()?;
    debug!(
        "SPK file {:?}: first summary record #{}",
        header.internal_name, header.fward
    );

    let comment = read_comment(bytes, header.fward as usize)?;
    let summary_size = header.summary_size();
    let summary_bytes = summary_size * DAF_WORD_SIZE;

    let mut segments = Vec::new();
    let mut visited = HashSet::new();
    let mut record_number = header.fward as usize;
    while record_number != 0 {
        if !visited.insert(record_number) {
            return Err(EphemerisError::Corrupt(format!(
                "summary record chain loops back to record #{record_number}"
            )));
        }
        let record = record_bytes(bytes, record_number, &format!("summary record #{record_number}"))?;
        let control = SummaryControl::parse(record, summary_size)?;
        trace!(
            "summary record #{record_number}: {} summaries, next #{}",
            control.nsum,
            control.next
        );

        for i in 0..control.nsum {
            let offset = CONTROL_SIZE + i * summary_bytes;
            let (_, summary) = SpkSummary::parse(&record[offset..offset + summary_bytes])
                .map_err(decode_error("SPK summary"))?;
            segments.push(read_type2_segment(bytes, &summary)?);
        }
        record_number = control.next;
    }

    let start = segments.iter().map(|s| s.start).reduce(f64::min);
    let end = segments.iter().map(|s| s.end).reduce(f64::max);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(EphemerisError::Corrupt(
            "SPK file holds no segment".to_string(),
        ));
    };

    Ok(SpkContents {
        header,
        comment,
        start,
        end,
        segments,
    })
}

/// Text of the comment records lying between the file record and the first summary record.
fn read_comment(bytes: &[u8], first_summary: usize) -> Result<String> {
    let mut text = Vec::new();
    for record_number in 2..first_summary {
        let record = record_bytes(bytes, record_number, "comment area")?;
        let chars = &record[..COMMENT_RECORD_CHARS];
        match chars.iter().position(|&b| b == COMMENT_EOT) {
            Some(end) => {
                text.extend_from_slice(&chars[..end]);
                break;
            }
            None => text.extend_from_slice(chars),
        }
    }
    Ok(String::from_utf8_lossy(&text)
        .replace('\0', "\n")
        .trim_end()
        .to_string())
}

fn read_type2_segment(bytes: &[u8], summary: &SpkSummary) -> Result<Segment> {
    SpkDataType::supported(summary.data_type)?;

    let words = summary.word_count();
    if summary.initial_addr < 1 || words < TYPE2_DIRECTORY_SIZE as i64 / DAF_WORD_SIZE as i64 {
        return Err(EphemerisError::Corrupt(format!(
            "segment {}->{} has addresses {}..={}",
            summary.target, summary.center, summary.initial_addr, summary.final_addr
        )));
    }

    let what = format!("segment {}->{} data", summary.target, summary.center);
    let data = checked_slice(
        bytes,
        (summary.initial_addr as u64 - 1) * DAF_WORD_SIZE as u64,
        words as u64 * DAF_WORD_SIZE as u64,
        &what,
    )?;

    let directory = Type2Directory::parse(&data[data.len() - TYPE2_DIRECTORY_SIZE..])?;
    let degree = directory.degree()?;
    let expected_words = directory.rsize as u64 * directory.n_records as u64 + 4;
    if expected_words != words as u64 {
        return Err(EphemerisError::Corrupt(format!(
            "segment {}->{} spans {words} words, {} records of {} words need {expected_words}",
            summary.target, summary.center, directory.n_records, directory.rsize
        )));
    }

    let tolerance = 1e-6 * directory.intlen.abs().max(1.0);
    let mut coefficients = Vec::with_capacity(directory.n_records * (directory.rsize - 2));
    for (k, record) in data
        .chunks_exact(directory.rsize * DAF_WORD_SIZE)
        .take(directory.n_records)
        .enumerate()
    {
        let (_, values) = count(le_f64::<_, nom::error::Error<&[u8]>>, directory.rsize)(record)
            .map_err(decode_error(&what))?;
        let (mid, radius) = (values[0], values[1]);
        let expected_mid = directory.init + (k as f64 + 0.5) * directory.intlen;
        if (mid - expected_mid).abs() > tolerance
            || (radius - 0.5 * directory.intlen).abs() > tolerance
        {
            return Err(EphemerisError::Corrupt(format!(
                "segment {}->{} record {k} covers {mid} ± {radius}, expected {expected_mid} ± {}",
                summary.target,
                summary.center,
                0.5 * directory.intlen
            )));
        }
        coefficients.extend_from_slice(&values[2..]);
    }

    trace!(
        "SPK segment {}->{}: {} records of degree {degree}",
        summary.target,
        summary.center,
        directory.n_records
    );

    Segment::with_layout(
        summary.target,
        summary.center,
        summary.frame,
        (summary.start, summary.end),
        degree,
        directory.n_records,
        (directory.init, directory.intlen),
        coefficients,
    )
}
