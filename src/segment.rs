//! Trajectory segments: one block of Chebyshev coefficients for a (body, center) pair.
//!
//! A [`Segment`] covers the interval `[start, end]` of the continuous time
//! scale. Its coefficient buffer is split into `sub_intervals` equally long
//! sub-intervals laid out from `origin` with length `step`:
//!
//! ```text
//! sub-interval k = [origin + k·step, origin + (k+1)·step)
//! ```
//!
//! Each sub-interval stores `degree + 1` coefficients for X, then Y, then Z.
//! Native kernels use `origin = start` and `step = (end − start) / sub_intervals`;
//! SPK type 2 segments take `origin`/`step` from the segment directory, whose
//! records may extend slightly past the declared `[start, end]`.

use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::bodies::body_label;
use crate::chebyshev;
use crate::constants::{BodyId, EphemerisTime};
use crate::ephemeris_errors::{EphemerisError, Result};

/// Relative tolerance, in units of `step`, accepted when checking that the
/// sub-interval layout covers `[start, end]`.
const LAYOUT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Target body identifier.
    pub body: BodyId,
    /// Reference center identifier.
    pub center: BodyId,
    /// Reference frame identifier (informational).
    pub frame: i32,
    /// First covered instant (continuous seconds).
    pub start: EphemerisTime,
    /// Last covered instant (continuous seconds).
    pub end: EphemerisTime,
    /// Degree of the Chebyshev series (coefficients per axis minus one).
    pub degree: usize,
    /// Number of sub-intervals.
    pub sub_intervals: usize,
    /// Start of the first sub-interval.
    pub origin: EphemerisTime,
    /// Length of every sub-interval.
    pub step: f64,
    coefficients: Vec<f64>,
}

impl Segment {
    /// Build a segment whose sub-intervals evenly partition `[start, end]`.
    ///
    /// Arguments
    /// -----------------
    /// * `body`, `center`: Identifiers of the pair.
    /// * `frame`: Frame identifier, carried along unchanged.
    /// * `start`, `end`: Interval bounds, `start < end`.
    /// * `degree`: Degree of the series.
    /// * `sub_intervals`: Number of sub-intervals, at least one.
    /// * `coefficients`: `(degree + 1) × 3 × sub_intervals` values.
    ///
    /// Return
    /// ----------
    /// * The validated segment, or [`EphemerisError::Corrupt`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        body: BodyId,
        center: BodyId,
        frame: i32,
        start: EphemerisTime,
        end: EphemerisTime,
        degree: usize,
        sub_intervals: usize,
        coefficients: Vec<f64>,
    ) -> Result<Self> {
        let step = if sub_intervals > 0 {
            (end - start) / sub_intervals as f64
        } else {
            0.0
        };
        Self::with_layout(
            body,
            center,
            frame,
            (start, end),
            degree,
            sub_intervals,
            (start, step),
            coefficients,
        )
    }

    /// Build a segment with an explicit sub-interval layout `(origin, step)`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn with_layout(
        body: BodyId,
        center: BodyId,
        frame: i32,
        (start, end): (EphemerisTime, EphemerisTime),
        degree: usize,
        sub_intervals: usize,
        (origin, step): (EphemerisTime, f64),
        coefficients: Vec<f64>,
    ) -> Result<Self> {
        let segment = Segment {
            body,
            center,
            frame,
            start,
            end,
            degree,
            sub_intervals,
            origin,
            step,
            coefficients,
        };
        segment.validate()?;
        Ok(segment)
    }

    fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start >= self.end {
            return Err(EphemerisError::Corrupt(format!(
                "segment {}->{} has non-monotonic interval [{}, {}]",
                self.body, self.center, self.start, self.end
            )));
        }
        if self.sub_intervals == 0 {
            return Err(EphemerisError::Corrupt(format!(
                "segment {}->{} declares no sub-interval",
                self.body, self.center
            )));
        }
        let expected = self.block_len() * self.sub_intervals;
        if self.coefficients.len() != expected {
            return Err(EphemerisError::Corrupt(format!(
                "segment {}->{} holds {} coefficients, degree {} with {} sub-intervals needs {expected}",
                self.body,
                self.center,
                self.coefficients.len(),
                self.degree,
                self.sub_intervals
            )));
        }
        // A zero or negative step is reported by the interpolation itself.
        if self.step.is_finite() && self.step > 0.0 {
            let tolerance = LAYOUT_TOLERANCE * self.step;
            let layout_end = self.origin + self.step * self.sub_intervals as f64;
            if self.origin > self.start + tolerance || layout_end < self.end - tolerance {
                return Err(EphemerisError::Corrupt(format!(
                    "segment {}->{} sub-intervals [{}, {}] do not cover [{}, {}]",
                    self.body, self.center, self.origin, layout_end, self.start, self.end
                )));
            }
        }
        Ok(())
    }

    /// Number of coefficients stored per sub-interval (three axes).
    pub fn block_len(&self) -> usize {
        3 * (self.degree + 1)
    }

    /// The whole coefficient buffer.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficients of sub-interval `index`, split per axis `(x, y, z)`.
    pub fn axis_coefficients(&self, index: usize) -> (&[f64], &[f64], &[f64]) {
        let n = self.degree + 1;
        let block = &self.coefficients[index * self.block_len()..(index + 1) * self.block_len()];
        (&block[..n], &block[n..2 * n], &block[2 * n..])
    }

    /// `true` if `t` lies in the closed interval `[start, end]`.
    pub fn contains(&self, t: EphemerisTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// Index of the sub-interval covering `t`.
    ///
    /// Sub-intervals are half-open, so a boundary instant belongs to the later
    /// one; the segment end is served by the last sub-interval.
    pub fn sub_interval_index(&self, t: EphemerisTime) -> Result<usize> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(EphemerisError::DegenerateSegment {
                body: self.body,
                center: self.center,
                sub_interval: 0,
            });
        }
        let raw = ((t - self.origin) / self.step).floor();
        let last = (self.sub_intervals - 1) as f64;
        Ok(raw.clamp(0.0, last) as usize)
    }

    /// Bounds `[lo, hi]` of sub-interval `index`.
    pub fn sub_interval_bounds(&self, index: usize) -> (EphemerisTime, EphemerisTime) {
        let lo = self.origin + self.step * index as f64;
        (lo, lo + self.step)
    }

    /// Position and velocity at `t`, see [`chebyshev::evaluate`].
    pub fn evaluate(&self, t: EphemerisTime) -> Result<(Vector3<f64>, Vector3<f64>)> {
        chebyshev::evaluate(self, t)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = vec![
            ("body", body_label(self.body)),
            ("center", body_label(self.center)),
            ("frame", self.frame.to_string()),
            ("start", format!("{}", Epoch::from_et_seconds(self.start))),
            ("end", format!("{}", Epoch::from_et_seconds(self.end))),
            ("degree", self.degree.to_string()),
            ("sub_intervals", self.sub_intervals.to_string()),
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
