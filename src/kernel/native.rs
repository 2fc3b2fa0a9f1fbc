//! Native `EPHKERNL` kernel layout.
//!
//! All values are little-endian.
//!
//! ```text
//! header (40 bytes)
//!   0  magic "EPHKERNL"        8
//!   8  version (u32)           4
//!  12  segment count (u32)     4
//!  16  validity start (f64)    8
//!  24  validity end (f64)      8
//!  32  directory offset (u64)  8
//!
//! directory record (48 bytes, `segment count` of them)
//!   0  body (i32)              4
//!   4  center (i32)            4
//!   8  start (f64)             8
//!  16  end (f64)               8
//!  24  degree (u16)            2
//!  26  sub-intervals (u16)     2
//!  28  frame (i32)             4
//!  32  data offset (u64)       8   bytes from the file start
//!  40  data length (u64)       8   in f64 words
//! ```
//!
//! Coefficient data holds, per sub-interval, `degree + 1` values for X, then Y, then Z.

use log::trace;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_i32, le_u16, le_u32, le_u64},
    IResult,
};

use crate::constants::{
    BodyId, NATIVE_DIRECTORY_RECORD_SIZE, NATIVE_HEADER_SIZE, NATIVE_MAGIC, NATIVE_VERSION,
};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::kernel::{checked_slice, decode_error};
use crate::segment::Segment;

#[derive(Debug, Clone, PartialEq)]
pub struct NativeHeader {
    pub magic: [u8; 8],
    pub version: u32,
    pub segment_count: u32,
    pub start: f64,
    pub end: f64,
    pub directory_offset: u64,
}

impl NativeHeader {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, magic) = take(8usize)(input)?;
        let (input, version) = le_u32(input)?;
        let (input, segment_count) = le_u32(input)?;
        let (input, start) = le_f64(input)?;
        let (input, end) = le_f64(input)?;
        let (input, directory_offset) = le_u64(input)?;

        let mut tag = [0u8; 8];
        tag.copy_from_slice(magic);
        Ok((
            input,
            NativeHeader {
                magic: tag,
                version,
                segment_count,
                start,
                end,
                directory_offset,
            },
        ))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.segment_count.to_le_bytes());
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(&self.directory_offset.to_le_bytes());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryRecord {
    pub body: BodyId,
    pub center: BodyId,
    pub start: f64,
    pub end: f64,
    pub degree: u16,
    pub sub_intervals: u16,
    pub frame: i32,
    pub data_offset: u64,
    pub data_len: u64,
}

impl DirectoryRecord {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, body) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, start) = le_f64(input)?;
        let (input, end) = le_f64(input)?;
        let (input, degree) = le_u16(input)?;
        let (input, sub_intervals) = le_u16(input)?;
        let (input, frame) = le_i32(input)?;
        let (input, data_offset) = le_u64(input)?;
        let (input, data_len) = le_u64(input)?;
        Ok((
            input,
            DirectoryRecord {
                body,
                center,
                start,
                end,
                degree,
                sub_intervals,
                frame,
                data_offset,
                data_len,
            },
        ))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.body.to_le_bytes());
        out.extend_from_slice(&self.center.to_le_bytes());
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(&self.degree.to_le_bytes());
        out.extend_from_slice(&self.sub_intervals.to_le_bytes());
        out.extend_from_slice(&self.frame.to_le_bytes());
        out.extend_from_slice(&self.data_offset.to_le_bytes());
        out.extend_from_slice(&self.data_len.to_le_bytes());
    }

    /// Number of f64 words the degree and sub-interval count call for.
    pub fn expected_len(&self) -> u64 {
        (u64::from(self.degree) + 1) * 3 * u64::from(self.sub_intervals)
    }
}

/// Decode a native kernel.
///
/// Arguments
/// -----------------
/// * `bytes`: Whole kernel, starting with the `EPHKERNL` magic.
///
/// Return
/// ----------
/// * The header and the segments in directory order.
///
/// Errors
/// ----------
/// * [`EphemerisError::Format`] for a foreign magic or an unknown version.
/// * [`EphemerisError::Truncated`] when the header, the directory or a coefficient block overruns the data.
/// * [`EphemerisError::Corrupt`] for inverted ranges, length mismatches or segments outside the validity range.
pub fn parse_native(bytes: &[u8]) -> Result<(NativeHeader, Vec<Segment>)> {
    if !bytes.starts_with(NATIVE_MAGIC) {
        return Err(EphemerisError::Format("missing EPHKERNL magic".to_string()));
    }
    let header_bytes = checked_slice(bytes, 0, NATIVE_HEADER_SIZE as u64, "native header")?;
    let (_, header) = NativeHeader::parse(header_bytes).map_err(decode_error("native header"))?;

    if header.version != NATIVE_VERSION {
        return Err(EphemerisError::Format(format!(
            "unsupported EPHKERNL version {}",
            header.version
        )));
    }
    if !header.start.is_finite() || !header.end.is_finite() || header.start >= header.end {
        return Err(EphemerisError::Corrupt(format!(
            "validity range [{}, {}] is not increasing",
            header.start, header.end
        )));
    }
    trace!(
        "native header: version {}, {} segments, directory at byte {}",
        header.version,
        header.segment_count,
        header.directory_offset
    );

    let directory = checked_slice(
        bytes,
        header.directory_offset,
        u64::from(header.segment_count) * NATIVE_DIRECTORY_RECORD_SIZE as u64,
        "segment directory",
    )?;
    let (_, records) = count(DirectoryRecord::parse, header.segment_count as usize)(directory)
        .map_err(decode_error("segment directory"))?;

    let segments = records
        .iter()
        .enumerate()
        .map(|(i, record)| read_segment(bytes, &header, i, record))
        .collect::<Result<Vec<_>>>()?;

    Ok((header, segments))
}

fn read_segment(
    bytes: &[u8],
    header: &NativeHeader,
    position: usize,
    record: &DirectoryRecord,
) -> Result<Segment> {
    if record.data_len != record.expected_len() {
        return Err(EphemerisError::Corrupt(format!(
            "segment {position} ({}->{}) stores {} coefficients, degree {} with {} sub-intervals needs {}",
            record.body,
            record.center,
            record.data_len,
            record.degree,
            record.sub_intervals,
            record.expected_len()
        )));
    }

    let what = format!("segment {position} coefficients");
    let data = checked_slice(bytes, record.data_offset, record.data_len.saturating_mul(8), &what)?;
    let (_, coefficients) =
        count(le_f64::<_, nom::error::Error<&[u8]>>, record.data_len as usize)(data)
            .map_err(decode_error(&what))?;

    let segment = Segment::new(
        record.body,
        record.center,
        record.frame,
        record.start,
        record.end,
        usize::from(record.degree),
        usize::from(record.sub_intervals),
        coefficients,
    )?;

    if segment.start < header.start || segment.end > header.end {
        return Err(EphemerisError::Corrupt(format!(
            "segment {position} ({}->{}) spans [{}, {}] outside the validity range [{}, {}]",
            segment.body, segment.center, segment.start, segment.end, header.start, header.end
        )));
    }

    trace!(
        "segment {position}: {}->{} over [{}, {}], degree {}, {} sub-intervals",
        segment.body,
        segment.center,
        segment.start,
        segment.end,
        segment.degree,
        segment.sub_intervals
    );
    Ok(segment)
}
