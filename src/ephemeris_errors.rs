use thiserror::Error;

use crate::constants::{BodyId, EphemerisTime};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, EphemerisError>;

#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Unrecognized kernel format: {0}")]
    Format(String),

    #[error("Truncated kernel: {what} needs bytes {start}..{end} but only {available} are available")]
    Truncated {
        what: String,
        start: u64,
        end: u64,
        available: u64,
    },

    #[error("Corrupt kernel: {0}")]
    Corrupt(String),

    #[error("Unsupported SPK data type: {0}")]
    UnsupportedSpkType(i32),

    #[error("No segment for body {body} relative to center {center}")]
    UnknownPair { body: BodyId, center: BodyId },

    #[error("Time {t} is outside the coverage {start}..{end} of body {body} relative to center {center}")]
    TimeOutOfRange {
        body: BodyId,
        center: BodyId,
        t: EphemerisTime,
        start: EphemerisTime,
        end: EphemerisTime,
    },

    #[error("Degenerate sub-interval {sub_interval} in segment of body {body} relative to center {center}")]
    DegenerateSegment {
        body: BodyId,
        center: BodyId,
        sub_interval: usize,
    },

    #[error("Time outside the representable domain: {0}")]
    TimeDomain(String),

    #[error("No path between body {body} and center {center}")]
    NoPath { body: BodyId, center: BodyId },

    #[error("Hop coverages between body {body} and center {center} do not overlap")]
    DisjointCoverage { body: BodyId, center: BodyId },

    #[error("Unknown body name: {0}")]
    UnknownBodyName(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

impl EphemerisError {
    pub(crate) fn truncated(what: impl Into<String>, start: u64, end: u64, available: usize) -> Self {
        EphemerisError::Truncated {
            what: what.into(),
            start,
            end,
            available: available as u64,
        }
    }
}

impl PartialEq for EphemerisError {
    fn eq(&self, other: &Self) -> bool {
        use EphemerisError::*;
        match (self, other) {
            (Format(a), Format(b)) => a == b,
            (
                Truncated {
                    what: w1,
                    start: s1,
                    end: e1,
                    available: a1,
                },
                Truncated {
                    what: w2,
                    start: s2,
                    end: e2,
                    available: a2,
                },
            ) => w1 == w2 && s1 == s2 && e1 == e2 && a1 == a2,
            (Corrupt(a), Corrupt(b)) => a == b,
            (UnsupportedSpkType(a), UnsupportedSpkType(b)) => a == b,
            (
                UnknownPair {
                    body: b1,
                    center: c1,
                },
                UnknownPair {
                    body: b2,
                    center: c2,
                },
            ) => b1 == b2 && c1 == c2,
            (
                TimeOutOfRange {
                    body: b1,
                    center: c1,
                    t: t1,
                    start: s1,
                    end: e1,
                },
                TimeOutOfRange {
                    body: b2,
                    center: c2,
                    t: t2,
                    start: s2,
                    end: e2,
                },
            ) => b1 == b2 && c1 == c2 && t1 == t2 && s1 == s2 && e1 == e2,
            (
                DegenerateSegment {
                    body: b1,
                    center: c1,
                    sub_interval: i1,
                },
                DegenerateSegment {
                    body: b2,
                    center: c2,
                    sub_interval: i2,
                },
            ) => b1 == b2 && c1 == c2 && i1 == i2,
            (TimeDomain(a), TimeDomain(b)) => a == b,
            (
                NoPath {
                    body: b1,
                    center: c1,
                },
                NoPath {
                    body: b2,
                    center: c2,
                },
            ) => b1 == b2 && c1 == c2,
            (
                DisjointCoverage {
                    body: b1,
                    center: c1,
                },
                DisjointCoverage {
                    body: b2,
                    center: c2,
                },
            ) => b1 == b2 && c1 == c2,
            (UnknownBodyName(a), UnknownBodyName(b)) => a == b,

            // I/O errors are not comparable: equal when the variant matches
            (Io(_), Io(_)) => true,

            _ => false,
        }
    }
}
