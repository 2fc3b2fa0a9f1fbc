//! Native kernel writer.
//!
//! Produces `EPHKERNL` v1 bytes: header, directory right after it, then the
//! coefficient blocks in segment order. Every segment goes through the same
//! checks the reader applies, so a written kernel always decodes.

use camino::Utf8Path;
use log::debug;

use crate::constants::{
    BodyId, DEFAULT_FRAME_ID, NATIVE_DIRECTORY_RECORD_SIZE, NATIVE_HEADER_SIZE, NATIVE_MAGIC,
    NATIVE_VERSION,
};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::kernel::native::{DirectoryRecord, NativeHeader};
use crate::segment::Segment;

/// Coefficients of one segment, as stored in a native kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentData {
    pub body: BodyId,
    pub center: BodyId,
    pub frame: i32,
    pub start: f64,
    pub end: f64,
    pub degree: u16,
    pub sub_intervals: u16,
    /// Per sub-interval, `degree + 1` values for X, then Y, then Z.
    pub coefficients: Vec<f64>,
}

impl SegmentData {
    /// Segment in the default frame.
    pub fn new(
        body: BodyId,
        center: BodyId,
        (start, end): (f64, f64),
        degree: u16,
        sub_intervals: u16,
        coefficients: Vec<f64>,
    ) -> Self {
        SegmentData {
            body,
            center,
            frame: DEFAULT_FRAME_ID,
            start,
            end,
            degree,
            sub_intervals,
            coefficients,
        }
    }

    fn to_segment(&self) -> Result<Segment> {
        Segment::new(
            self.body,
            self.center,
            self.frame,
            self.start,
            self.end,
            usize::from(self.degree),
            usize::from(self.sub_intervals),
            self.coefficients.clone(),
        )
    }
}

/// Builder of native kernels.
#[derive(Debug, Clone, Default)]
pub struct KernelWriter {
    validity_range: Option<(f64, f64)>,
    segments: Vec<SegmentData>,
}

impl KernelWriter {
    pub fn new() -> Self {
        KernelWriter::default()
    }

    /// Set the global validity range; by default it spans all segments.
    pub fn with_validity_range(mut self, start: f64, end: f64) -> Self {
        self.validity_range = Some((start, end));
        self
    }

    pub fn with_segment(mut self, segment: SegmentData) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn push_segment(&mut self, segment: SegmentData) {
        self.segments.push(segment);
    }

    fn resolved_range(&self) -> Result<(f64, f64)> {
        if let Some(range) = self.validity_range {
            return Ok(range);
        }
        let start = self.segments.iter().map(|s| s.start).reduce(f64::min);
        let end = self.segments.iter().map(|s| s.end).reduce(f64::max);
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(EphemerisError::Corrupt(
                "a kernel without segments needs an explicit validity range".to_string(),
            )),
        }
    }

    /// Encode the kernel.
    ///
    /// Return
    /// ----------
    /// * The kernel bytes, or [`EphemerisError::Corrupt`] if a segment breaks
    ///   the layout invariants or lies outside the validity range.
    pub fn write_to_vec(&self) -> Result<Vec<u8>> {
        let (start, end) = self.resolved_range()?;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(EphemerisError::Corrupt(format!(
                "validity range [{start}, {end}] is not increasing"
            )));
        }

        for data in &self.segments {
            let segment = data.to_segment()?;
            if segment.start < start || segment.end > end {
                return Err(EphemerisError::Corrupt(format!(
                    "segment {}->{} spans [{}, {}] outside the validity range [{start}, {end}]",
                    segment.body, segment.center, segment.start, segment.end
                )));
            }
        }

        let segment_count = u32::try_from(self.segments.len()).map_err(|_| {
            EphemerisError::Corrupt("too many segments for a native kernel".to_string())
        })?;
        let directory_offset = NATIVE_HEADER_SIZE as u64;
        let mut data_offset =
            directory_offset + (self.segments.len() * NATIVE_DIRECTORY_RECORD_SIZE) as u64;

        let mut bytes = Vec::new();
        NativeHeader {
            magic: *NATIVE_MAGIC,
            version: NATIVE_VERSION,
            segment_count,
            start,
            end,
            directory_offset,
        }
        .encode(&mut bytes);

        for data in &self.segments {
            let record = DirectoryRecord {
                body: data.body,
                center: data.center,
                start: data.start,
                end: data.end,
                degree: data.degree,
                sub_intervals: data.sub_intervals,
                frame: data.frame,
                data_offset,
                data_len: data.coefficients.len() as u64,
            };
            record.encode(&mut bytes);
            data_offset += record.data_len * 8;
        }

        for data in &self.segments {
            for value in &data.coefficients {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }

        debug!(
            "encoded native kernel: {} segments, {} bytes",
            self.segments.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Encode the kernel and write it to `path`.
    pub fn write_to_path(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let bytes = self.write_to_vec()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}
