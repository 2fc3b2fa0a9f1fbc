//! Trailer of an SPK type 2 segment.
//!
//! The last four f64 words of a type 2 segment describe its records:
//!
//! * `init`: start of the first record (TDB seconds past J2000),
//! * `intlen`: time span of every record (seconds),
//! * `rsize`: record size in f64 words (`2 + 3 × (degree + 1)`),
//! * `n_records`: number of records.
//!
//! Every record is `mid, radius` followed by the X, Y and Z coefficients.

use std::fmt;

use hifitime::{Duration, Epoch};
use nom::{number::complete::le_f64, sequence::tuple, IResult};

use crate::ephemeris_errors::{EphemerisError, Result};

/// Size in bytes of the trailer.
pub const TYPE2_DIRECTORY_SIZE: usize = 32;

#[derive(Debug, PartialEq, Clone)]
pub struct Type2Directory {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

fn word_count(value: f64, what: &str) -> Result<usize> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(EphemerisError::Corrupt(format!(
            "type 2 directory {what} {value} is not a positive count"
        )))
    }
}

impl Type2Directory {
    /// Decode the four trailing words of a type 2 segment.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: The 32 bytes holding `init, intlen, rsize, n_records`.
    ///
    /// Return
    /// ----------
    /// * The directory, or [`EphemerisError::Corrupt`] when `rsize` or
    ///   `n_records` is not a positive integer.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let words: IResult<&[u8], (f64, f64, f64, f64)> =
            tuple((le_f64, le_f64, le_f64, le_f64))(input);
        let (_, (init, intlen, rsize, n_records)) = words.map_err(|_| {
            EphemerisError::Corrupt("type 2 directory is unreadable".to_string())
        })?;

        Ok(Type2Directory {
            init,
            intlen,
            rsize: word_count(rsize, "record size")?,
            n_records: word_count(n_records, "record count")?,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        for word in [
            self.init,
            self.intlen,
            self.rsize as f64,
            self.n_records as f64,
        ] {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }

    /// Degree of the Chebyshev series implied by the record size.
    pub fn degree(&self) -> Result<usize> {
        let per_axis = self.rsize.checked_sub(2).filter(|w| w % 3 == 0).map(|w| w / 3);
        match per_axis {
            Some(n) if n >= 1 => Ok(n - 1),
            _ => Err(EphemerisError::Corrupt(format!(
                "type 2 record size {} is not 2 + 3 × (degree + 1)",
                self.rsize
            ))),
        }
    }
}

impl fmt::Display for Type2Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+-----------+----------------------------+")?;
        writeln!(
            f,
            "| {:<9} | {:<26} |",
            "init",
            Epoch::from_et_seconds(self.init).to_string()
        )?;
        writeln!(
            f,
            "| {:<9} | {:<26} |",
            "intlen",
            Duration::from_seconds(self.intlen).to_string()
        )?;
        writeln!(f, "| {:<9} | {:<26} |", "rsize", self.rsize)?;
        writeln!(f, "| {:<9} | {:<26} |", "n_records", self.n_records)?;
        writeln!(f, "+-----------+----------------------------+")
    }
}
