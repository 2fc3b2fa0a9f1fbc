//! DAF summary records.
//!
//! Summary records form a doubly linked list of 1024-byte records. Each starts
//! with three control words stored as f64 (next record, previous record,
//! number of summaries), followed by the summaries themselves. For SPK
//! (`ND = 2`, `NI = 6`) a summary is 40 bytes:
//!
//! ```text
//! start (f64) | end (f64) | target | center | frame | data type | initial address | final address
//! ```
//!
//! Addresses count f64 words from 1.

use std::fmt;

use hifitime::Epoch;
use nom::{
    number::complete::{le_f64, le_i32},
    sequence::tuple,
    IResult,
};

use crate::bodies::body_label;
use crate::constants::{BodyId, DAF_RECORD_SIZE, DAF_WORD_SIZE};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::kernel::spk_data_type::SpkDataType;

/// Size in bytes of the control area opening a summary record.
pub const CONTROL_SIZE: usize = 3 * DAF_WORD_SIZE;

/// Control words of a summary record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryControl {
    /// Record number of the next summary record, 0 for the last one.
    pub next: usize,
    /// Record number of the previous summary record, 0 for the first one.
    pub prev: usize,
    /// Number of summaries stored in this record.
    pub nsum: usize,
}

fn record_number(value: f64, what: &str) -> Result<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(EphemerisError::Corrupt(format!(
            "summary record {what} word {value} is not a record count"
        )))
    }
}

impl SummaryControl {
    /// Decode and validate the control words of a summary record.
    ///
    /// Arguments
    /// -----------------
    /// * `record`: The whole 1024-byte summary record.
    /// * `summary_size`: Size of one summary in f64 words.
    pub fn parse(record: &[u8], summary_size: usize) -> Result<Self> {
        let words: IResult<&[u8], (f64, f64, f64)> = tuple((le_f64, le_f64, le_f64))(record);
        let (_, (next, prev, nsum)) = words.map_err(|_| {
            EphemerisError::Corrupt("summary record control area is unreadable".to_string())
        })?;

        let control = SummaryControl {
            next: record_number(next, "next")?,
            prev: record_number(prev, "previous")?,
            nsum: record_number(nsum, "count")?,
        };

        let capacity = (DAF_RECORD_SIZE - CONTROL_SIZE) / (summary_size * DAF_WORD_SIZE);
        if control.nsum > capacity {
            return Err(EphemerisError::Corrupt(format!(
                "summary record declares {} summaries but holds at most {capacity}",
                control.nsum
            )));
        }
        Ok(control)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.next as f64).to_le_bytes());
        out.extend_from_slice(&(self.prev as f64).to_le_bytes());
        out.extend_from_slice(&(self.nsum as f64).to_le_bytes());
    }
}

/// Descriptor of one SPK segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSummary {
    pub start: f64,
    pub end: f64,
    pub target: BodyId,
    pub center: BodyId,
    pub frame: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl SpkSummary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start) = le_f64(input)?;
        let (input, end) = le_f64(input)?;
        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            SpkSummary {
                start,
                end,
                target,
                center,
                frame,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        for word in [
            self.target,
            self.center,
            self.frame,
            self.data_type,
            self.initial_addr,
            self.final_addr,
        ] {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }

    /// Number of f64 words in the segment data.
    pub fn word_count(&self) -> i64 {
        i64::from(self.final_addr) - i64::from(self.initial_addr) + 1
    }
}

impl fmt::Display for SpkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data_type = SpkDataType::try_from(self.data_type)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| format!("unknown [type {}]", self.data_type));

        let fields = vec![
            ("start", Epoch::from_et_seconds(self.start).to_string()),
            ("end", Epoch::from_et_seconds(self.end).to_string()),
            ("target", body_label(self.target)),
            ("center", body_label(self.center)),
            ("frame", self.frame.to_string()),
            ("data type", data_type),
            (
                "addresses",
                format!("{}..={}", self.initial_addr, self.final_addr),
            ),
        ];

        let label_width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(10);
        let value_width = fields.iter().map(|(_, v)| v.len()).max().unwrap_or(10);
        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = label_width + 2,
            value = value_width + 2
        );

        writeln!(f, "{border}")?;
        for (label, value) in fields {
            writeln!(f, "| {label:<label_width$} | {value:<value_width$} |")?;
        }
        writeln!(f, "{border}")
    }
}
