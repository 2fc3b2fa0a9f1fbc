//! Kernel reader.
//!
//! A kernel is an immutable, memory-resident copy of a binary ephemeris file.
//! Two containers are understood, told apart by their leading bytes:
//!
//! * the native `EPHKERNL` format (see [`native`]), written by [`writer::KernelWriter`];
//! * NAIF DAF/SPK files holding Chebyshev (type 2) segments (see [`spk`]).
//!
//! Both are decoded into the same [`Segment`] representation. Loading copies
//! the data into memory, so a [`Kernel`] never touches the file system again.
//!
//! # See also
//! ------------
//! * [`crate::segment_index::SegmentIndex`] – Lookup structure built from the segments.
//! * [`crate::ephemeris::Ephemeris`] – Query handle built on top of a kernel.

pub mod daf_header;
pub mod directory;
pub mod native;
pub mod spk;
pub mod spk_data_type;
pub mod summary_record;
pub mod writer;

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use log::debug;

use crate::constants::{DAF_SPK_IDWORD, NATIVE_MAGIC};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::segment::Segment;

/// Where kernel bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelSource {
    /// Read the whole file at this path.
    Path(Utf8PathBuf),
    /// Use an in-memory copy of a kernel.
    Bytes(Vec<u8>),
}

impl From<Utf8PathBuf> for KernelSource {
    fn from(path: Utf8PathBuf) -> Self {
        KernelSource::Path(path)
    }
}

impl From<&Utf8Path> for KernelSource {
    fn from(path: &Utf8Path) -> Self {
        KernelSource::Path(path.to_owned())
    }
}

impl From<Vec<u8>> for KernelSource {
    fn from(bytes: Vec<u8>) -> Self {
        KernelSource::Bytes(bytes)
    }
}

impl From<&[u8]> for KernelSource {
    fn from(bytes: &[u8]) -> Self {
        KernelSource::Bytes(bytes.to_vec())
    }
}

/// Container format a kernel was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFormat {
    Native { version: u32 },
    Spk,
}

impl fmt::Display for KernelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelFormat::Native { version } => write!(f, "EPHKERNL v{version}"),
            KernelFormat::Spk => write!(f, "NAIF DAF/SPK"),
        }
    }
}

/// Decoded kernel: global validity range and segments, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    format: KernelFormat,
    start: f64,
    end: f64,
    segments: Vec<Segment>,
    comment: Option<String>,
}

impl Kernel {
    /// Load a kernel from a path or from bytes.
    ///
    /// Arguments
    /// -----------------
    /// * `source`: A [`KernelSource`], or anything converting into one
    ///   (`Utf8PathBuf`, `&Utf8Path`, `Vec<u8>`, `&[u8]`).
    ///
    /// Return
    /// ----------
    /// * The decoded kernel, or:
    ///   - [`EphemerisError::Io`] if the file cannot be read,
    ///   - [`EphemerisError::Format`] if the leading bytes match no known format,
    ///   - [`EphemerisError::Truncated`] if a declared byte range exceeds the data,
    ///   - [`EphemerisError::Corrupt`] if a segment breaks a structural invariant,
    ///   - [`EphemerisError::UnsupportedSpkType`] for SPK segments other than type 2.
    pub fn load(source: impl Into<KernelSource>) -> Result<Self> {
        match source.into() {
            KernelSource::Path(path) => Kernel::open(path),
            KernelSource::Bytes(bytes) => Kernel::from_bytes(&bytes),
        }
    }

    /// Read and decode the kernel file at `path`.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading kernel file {path}");
        let bytes = std::fs::read(path)?;
        Kernel::from_bytes(&bytes)
    }

    /// Decode a kernel from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let kernel = if bytes.starts_with(NATIVE_MAGIC) {
            let (header, segments) = native::parse_native(bytes)?;
            Kernel {
                format: KernelFormat::Native {
                    version: header.version,
                },
                start: header.start,
                end: header.end,
                segments,
                comment: None,
            }
        } else if bytes.starts_with(DAF_SPK_IDWORD.as_bytes()) {
            let contents = spk::parse_spk(bytes)?;
            Kernel {
                format: KernelFormat::Spk,
                start: contents.start,
                end: contents.end,
                segments: contents.segments,
                comment: Some(contents.comment),
            }
        } else {
            let head = &bytes[..bytes.len().min(8)];
            return Err(EphemerisError::Format(format!(
                "unknown leading bytes {:?}",
                String::from_utf8_lossy(head)
            )));
        };

        debug!(
            "loaded {} kernel: {} segments over [{}, {}]",
            kernel.format,
            kernel.segments.len(),
            kernel.start,
            kernel.end
        );
        Ok(kernel)
    }

    pub fn format(&self) -> KernelFormat {
        self.format
    }

    /// Global validity range `[start, end]` in continuous seconds.
    pub fn validity_range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Comment area of an SPK kernel.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("format", self.format.to_string()),
            ("start", Epoch::from_et_seconds(self.start).to_string()),
            ("end", Epoch::from_et_seconds(self.end).to_string()),
            ("segments", self.segments.len().to_string()),
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

/// Length-checked sub-slice `bytes[start..start + len]`.
///
/// Fails with [`EphemerisError::Truncated`] naming `what` when the range does
/// not fit in `bytes`, overflow included.
pub(crate) fn checked_slice<'a>(bytes: &'a [u8], start: u64, len: u64, what: &str) -> Result<&'a [u8]> {
    let end = start.saturating_add(len);
    if end > bytes.len() as u64 {
        return Err(EphemerisError::truncated(what, start, end, bytes.len()));
    }
    Ok(&bytes[start as usize..end as usize])
}

/// Map a `nom` failure on an already length-checked slice to a corruption error.
pub(crate) fn decode_error<E>(what: &str) -> impl FnOnce(E) -> EphemerisError + '_ {
    move |_| EphemerisError::Corrupt(format!("unable to decode {what}"))
}
