//! Chebyshev interpolation engine.
//!
//! Positions are stored as Chebyshev series per axis over each sub-interval of
//! a [`Segment`]. For an instant `t` in a sub-interval `[lo, hi]` with midpoint
//! `mid` and half-span `h`, the normalized argument is
//!
//! ```text
//! x = (t − mid) / h ∈ [-1, 1]
//! ```
//!
//! and
//!
//! * position `p(t) = Σ cₖ Tₖ(x)`,
//! * velocity `v(t) = (1/h) Σ k·cₖ Uₖ₋₁(x)`,
//!
//! where `Tₖ`/`Uₖ` are the Chebyshev polynomials of the first/second kind.
//! Both series are summed with Clenshaw's recurrence, whose rounding error
//! does not grow with the degree the way an expansion in powers of `x` does.
//!
//! Every function here is pure: the same inputs always give bit-identical outputs.

use nalgebra::Vector3;

use crate::constants::EphemerisTime;
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::segment::Segment;

/// Sum `Σ cₖ Tₖ(x)` with Clenshaw's recurrence.
///
/// Arguments
/// -----------------
/// * `coefficients`: `[c0, c1, …, cn]`, lowest degree first.
/// * `x`: Normalized argument, expected in `[-1, 1]`.
///
/// Return
/// ----------
/// * The value of the series; `0.0` for an empty series.
pub fn clenshaw(coefficients: &[f64], x: f64) -> f64 {
    match coefficients {
        [] => 0.0,
        [c0] => *c0,
        [c0, rest @ ..] => {
            let two_x = 2.0 * x;
            let (mut b1, mut b2) = (0.0, 0.0);
            for &c in rest.iter().rev() {
                let b0 = two_x * b1 - b2 + c;
                b2 = b1;
                b1 = b0;
            }
            c0 + x * b1 - b2
        }
    }
}

/// Derivative `d/dx Σ cₖ Tₖ(x)`, summed as the second-kind series `Σ (k+1)·cₖ₊₁ Uₖ(x)`.
///
/// Arguments
/// -----------------
/// * `coefficients`: `[c0, c1, …, cn]`, lowest degree first.
/// * `x`: Normalized argument, expected in `[-1, 1]`.
///
/// Return
/// ----------
/// * The derivative with respect to `x`; `0.0` for series of degree 0.
pub fn clenshaw_derivative(coefficients: &[f64], x: f64) -> f64 {
    let two_x = 2.0 * x;
    let (mut b1, mut b2) = (0.0, 0.0);
    for (k, &c) in coefficients.iter().enumerate().skip(1).rev() {
        let b0 = two_x * b1 - b2 + k as f64 * c;
        b2 = b1;
        b1 = b0;
    }
    // U0 = 1 and U1 = 2x, so the recurrence closes on b1 alone.
    b1
}

/// Map `t` affinely onto `[-1, 1]` for a sub-interval of midpoint `mid` and half-span `half_span`.
///
/// The result is clamped to absorb rounding at the sub-interval edges.
pub fn normalize_time(t: EphemerisTime, mid: EphemerisTime, half_span: f64) -> f64 {
    ((t - mid) / half_span).clamp(-1.0, 1.0)
}

/// Evaluate position and velocity of a segment at `t`.
///
/// Arguments
/// -----------------
/// * `segment`: The segment to evaluate; its degree and sub-interval count drive the evaluation.
/// * `t`: Instant on the continuous time scale, within `[segment.start, segment.end]`.
///
/// Return
/// ----------
/// * `(position, velocity)`, velocity being the position derivative per unit of continuous time.
///
/// Errors
/// ----------
/// * [`EphemerisError::TimeOutOfRange`] if `t` is outside the segment.
/// * [`EphemerisError::DegenerateSegment`] if the covering sub-interval has no positive span.
///
/// See also
/// ------------
/// * [`clenshaw`] / [`clenshaw_derivative`] – The per-axis summations.
/// * [`Segment::sub_interval_index`] – Sub-interval lookup.
pub fn evaluate(segment: &Segment, t: EphemerisTime) -> Result<(Vector3<f64>, Vector3<f64>)> {
    if !segment.contains(t) {
        return Err(EphemerisError::TimeOutOfRange {
            body: segment.body,
            center: segment.center,
            t,
            start: segment.start,
            end: segment.end,
        });
    }

    let index = segment.sub_interval_index(t)?;
    let (lo, hi) = segment.sub_interval_bounds(index);
    let half_span = 0.5 * (hi - lo);
    if !(half_span.is_finite() && half_span > 0.0) {
        return Err(EphemerisError::DegenerateSegment {
            body: segment.body,
            center: segment.center,
            sub_interval: index,
        });
    }

    let x = normalize_time(t, lo + half_span, half_span);
    let (cx, cy, cz) = segment.axis_coefficients(index);

    let position = Vector3::new(clenshaw(cx, x), clenshaw(cy, x), clenshaw(cz, x));
    let velocity = Vector3::new(
        clenshaw_derivative(cx, x),
        clenshaw_derivative(cy, x),
        clenshaw_derivative(cz, x),
    ) / half_span;

    Ok((position, velocity))
}
