//! DAF file record.
//!
//! The first 1024-byte record of a NAIF Double Array File describes the
//! container:
//!
//! * **`idword`**: `"DAF/SPK"` for SPK kernels.
//! * **`nd`** / **`ni`**: double / integer components per array summary
//!   (2 and 6 for SPK).
//! * **`fward`** / **`bward`**: record numbers (1-based) of the first and last
//!   summary records.
//! * **`free`**: first free address (1-based, in f64 words).
//! * **`locfmt`**: binary format of the numbers stored in the file, `"LTL-IEEE"`
//!   or `"BIG-IEEE"`.
//!
//! Only little-endian files are decoded; [`DafHeader::check`] rejects the rest.

use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::constants::{DAF_RECORD_SIZE, DAF_SPK_IDWORD, SPK_ND, SPK_NI};
use crate::ephemeris_errors::{EphemerisError, Result};

/// Offset of the FTP validation string inside the file record.
const FTPSTR_OFFSET: usize = 699;

/// NAIF FTP validation string, detecting text-mode transfer damage.
pub const FTPSTR: &[u8; 28] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";

#[derive(Debug, PartialEq, Clone)]
pub struct DafHeader {
    pub idword: String,
    pub internal_name: String,
    pub nd: i32,
    pub ni: i32,
    pub fward: i32,
    pub bward: i32,
    pub free: i32,
    pub locfmt: String,
}

fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

impl DafHeader {
    /// Decode the leading fields of a DAF file record.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, idword) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, internal_name) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        Ok((
            input,
            DafHeader {
                idword: ascii_field(idword),
                internal_name: ascii_field(internal_name),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: ascii_field(locfmt),
            },
        ))
    }

    /// Check that the file is a little-endian SPK with the standard summary shape.
    ///
    /// Return
    /// ----------
    /// * [`EphemerisError::Format`] for another DAF flavour, a big-endian file
    ///   or a non-SPK summary shape.
    /// * [`EphemerisError::Corrupt`] for summary record pointers that cannot be valid.
    pub fn check(&self) -> Result<()> {
        if self.idword != DAF_SPK_IDWORD {
            return Err(EphemerisError::Format(format!(
                "DAF identification word {:?} is not {DAF_SPK_IDWORD:?}",
                self.idword
            )));
        }
        match self.locfmt.as_str() {
            "LTL-IEEE" => {}
            "BIG-IEEE" => {
                return Err(EphemerisError::Format(
                    "big-endian (BIG-IEEE) DAF files are not supported".to_string(),
                ))
            }
            other => {
                return Err(EphemerisError::Format(format!(
                    "unknown DAF binary format {other:?}"
                )))
            }
        }
        if self.nd != SPK_ND || self.ni != SPK_NI {
            return Err(EphemerisError::Format(format!(
                "SPK summaries need ND = {SPK_ND} and NI = {SPK_NI}, found ND = {} and NI = {}",
                self.nd, self.ni
            )));
        }
        if self.fward < 2 || self.bward < 2 {
            return Err(EphemerisError::Corrupt(format!(
                "summary record pointers {} / {} point inside the file record",
                self.fward, self.bward
            )));
        }
        Ok(())
    }

    /// Size of one array summary, in f64 words.
    pub fn summary_size(&self) -> usize {
        self.nd.max(0) as usize + (self.ni.max(0) as usize).div_ceil(2)
    }

    /// Encode the header as a full 1024-byte file record.
    pub fn encode(&self) -> Vec<u8> {
        fn padded(text: &str, width: usize) -> Vec<u8> {
            let mut field = text.as_bytes().to_vec();
            field.resize(width, b' ');
            field
        }

        let mut record = Vec::with_capacity(DAF_RECORD_SIZE);
        record.extend(padded(&self.idword, 8));
        record.extend_from_slice(&self.nd.to_le_bytes());
        record.extend_from_slice(&self.ni.to_le_bytes());
        record.extend(padded(&self.internal_name, 60));
        record.extend_from_slice(&self.fward.to_le_bytes());
        record.extend_from_slice(&self.bward.to_le_bytes());
        record.extend_from_slice(&self.free.to_le_bytes());
        record.extend(padded(&self.locfmt, 8));
        record.resize(FTPSTR_OFFSET, 0);
        record.extend_from_slice(FTPSTR);
        record.resize(DAF_RECORD_SIZE, 0);
        record
    }
}

impl fmt::Display for DafHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("ID word", self.idword.clone()),
            ("Internal name", self.internal_name.clone()),
            ("ND / NI", format!("{} / {}", self.nd, self.ni)),
            (
                "Summary records",
                format!("first #{}, last #{}", self.fward, self.bward),
            ),
            ("First free address", self.free.to_string()),
            ("Binary format", self.locfmt.clone()),
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

#[cfg(test)]
mod test_daf_header {
    use super::*;

    fn spk_header() -> DafHeader {
        DafHeader {
            idword: "DAF/SPK".to_string(),
            internal_name: "TEST KERNEL".to_string(),
            nd: 2,
            ni: 6,
            fward: 2,
            bward: 2,
            free: 400,
            locfmt: "LTL-IEEE".to_string(),
        }
    }

    #[test]
    fn test_encode_then_parse() {
        let record = spk_header().encode();
        assert_eq!(record.len(), DAF_RECORD_SIZE);
        assert_eq!(&record[FTPSTR_OFFSET..FTPSTR_OFFSET + 28], FTPSTR);

        let (_, parsed) = DafHeader::parse(&record).unwrap();
        assert_eq!(parsed, spk_header());
        assert_eq!(parsed.summary_size(), 5);
    }

    #[test]
    fn test_check() {
        assert!(spk_header().check().is_ok());

        let big_endian = DafHeader {
            locfmt: "BIG-IEEE".to_string(),
            ..spk_header()
        };
        assert!(matches!(big_endian.check(), Err(EphemerisError::Format(_))));

        let pck = DafHeader {
            idword: "DAF/PCK".to_string(),
            ..spk_header()
        };
        assert!(matches!(pck.check(), Err(EphemerisError::Format(_))));

        let odd_shape = DafHeader {
            nd: 3,
            ..spk_header()
        };
        assert!(matches!(odd_shape.check(), Err(EphemerisError::Format(_))));

        let bad_pointer = DafHeader {
            fward: 1,
            ..spk_header()
        };
        assert!(matches!(bad_pointer.check(), Err(EphemerisError::Corrupt(_))));
    }

    #[test]
    fn test_display() {
        let output = format!("{}", spk_header());
        assert!(output.contains("| ID word            | DAF/SPK"));
        assert!(output.contains("first #2, last #2"));
    }
}
