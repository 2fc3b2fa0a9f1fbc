//! Relative state of a body.
//!
//! Units
//! -----------------
//! * `position`: kernel length unit (km for SPK kernels)
//! * `velocity`: kernel length unit per second of continuous time (km/s)
//!
//! [`StateVector::to_au`] converts km-based states to AU and AU/day.
//! [`StateVector::to_ecliptic`] rotates an equatorial state onto the ecliptic
//! and [`StateVector::spherical`] gives its longitude, latitude and distance.
//!
//! Arithmetic semantics
//! -----------------
//! States chain like relative vectors:
//!
//! * `-(A wrt B)` is `B wrt A`,
//! * `(A wrt B) + (B wrt C)` is `A wrt C`,
//! * `(A wrt C) - (B wrt C)` is `A wrt B`.
//!
//! Operands are combined component-wise; the epoch of the left operand is kept.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::bodies::body_label;
use crate::constants::{BodyId, EphemerisTime, AU, SECONDS_PER_DAY};
use crate::ecliptic::{equatorial_to_ecliptic, mean_obliquity, SphericalCoordinates};

#[derive(Debug, PartialEq, Clone)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub body: BodyId,
    pub center: BodyId,
    /// Evaluation instant on the continuous time scale.
    pub epoch: EphemerisTime,
}

impl StateVector {
    pub fn new(
        body: BodyId,
        center: BodyId,
        epoch: EphemerisTime,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        StateVector {
            position,
            velocity,
            body,
            center,
            epoch,
        }
    }

    /// State of a body relative to itself.
    pub fn zero(body: BodyId, epoch: EphemerisTime) -> Self {
        StateVector::new(body, body, epoch, Vector3::zeros(), Vector3::zeros())
    }

    /// Convert a km, km/s state to AU, AU/day.
    #[must_use = "`.to_au()` returns a new StateVector; assign or use it"]
    pub fn to_au(&self) -> Self {
        StateVector {
            position: self.position / AU,
            velocity: self.velocity * (SECONDS_PER_DAY / AU),
            ..self.clone()
        }
    }

    /// Euclidean distance between body and center.
    pub fn distance(&self) -> f64 {
        self.position.norm()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Rotate an equatorial state onto the J2000 mean ecliptic.
    ///
    /// See also
    /// ------------
    /// * [`Self::to_ecliptic_with`] – Same rotation for another obliquity.
    #[must_use = "`.to_ecliptic()` returns a new StateVector; assign or use it"]
    pub fn to_ecliptic(&self) -> Self {
        self.to_ecliptic_with(mean_obliquity(0.0))
    }

    /// Rotate position and velocity about the x axis onto the plane tilted by
    /// `obliquity` radians, e.g. [`mean_obliquity`] at the state epoch.
    #[must_use = "`.to_ecliptic_with()` returns a new StateVector; assign or use it"]
    pub fn to_ecliptic_with(&self, obliquity: f64) -> Self {
        let rotation = equatorial_to_ecliptic(obliquity);
        StateVector {
            position: rotation * self.position,
            velocity: rotation * self.velocity,
            ..self.clone()
        }
    }

    /// Longitude, latitude and distance of the position, in its own frame.
    pub fn spherical(&self) -> SphericalCoordinates {
        SphericalCoordinates::from_cartesian(&self.position)
    }
}

impl Neg for StateVector {
    type Output = StateVector;

    fn neg(self) -> Self::Output {
        StateVector {
            position: -self.position,
            velocity: -self.velocity,
            body: self.center,
            center: self.body,
            epoch: self.epoch,
        }
    }
}

impl Add for StateVector {
    type Output = StateVector;

    fn add(self, rhs: Self) -> Self::Output {
        StateVector {
            position: self.position + rhs.position,
            velocity: self.velocity + rhs.velocity,
            body: self.body,
            center: rhs.center,
            epoch: self.epoch,
        }
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: Self) -> Self::Output {
        StateVector {
            position: self.position - rhs.position,
            velocity: self.velocity - rhs.velocity,
            body: self.body,
            center: rhs.body,
            epoch: self.epoch,
        }
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} relative to {} at {}",
            body_label(self.body),
            body_label(self.center),
            Epoch::from_et_seconds(self.epoch)
        )?;
        writeln!(
            f,
            "  position: [{:>+.9e}, {:>+.9e}, {:>+.9e}]",
            self.position.x, self.position.y, self.position.z
        )?;
        write!(
            f,
            "  velocity: [{:>+.9e}, {:>+.9e}, {:>+.9e}]",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}

#[cfg(test)]
mod test_state_vector {
    use super::*;
    use approx::assert_relative_eq;

    fn earth_wrt_emb() -> StateVector {
        StateVector::new(
            399,
            3,
            0.0,
            Vector3::new(-4000.0, 1000.0, 500.0),
            Vector3::new(0.01, -0.002, 0.0),
        )
    }

    fn emb_wrt_ssb() -> StateVector {
        StateVector::new(
            3,
            0,
            0.0,
            Vector3::new(-2.6e7, 1.3e8, 5.6e7),
            Vector3::new(-29.8, -5.0, -2.2),
        )
    }

    #[test]
    fn test_neg_swaps_bodies() {
        let reversed = -earth_wrt_emb();
        assert_eq!((reversed.body, reversed.center), (3, 399));
        assert_eq!(reversed.position, Vector3::new(4000.0, -1000.0, -500.0));
        assert_eq!(-reversed, earth_wrt_emb());
    }

    #[test]
    fn test_chaining() {
        let earth_wrt_ssb = earth_wrt_emb() + emb_wrt_ssb();
        assert_eq!((earth_wrt_ssb.body, earth_wrt_ssb.center), (399, 0));
        assert_relative_eq!(earth_wrt_ssb.position.x, -2.6e7 - 4000.0);

        let back = earth_wrt_ssb - emb_wrt_ssb();
        assert_eq!((back.body, back.center), (399, 3));
        assert_relative_eq!(back.position.x, -4000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_to_au() {
        let state = StateVector::new(
            10,
            0,
            0.0,
            Vector3::new(AU, 0.0, 0.0),
            Vector3::new(AU / SECONDS_PER_DAY, 0.0, 0.0),
        )
        .to_au();
        assert_relative_eq!(state.position.x, 1.0);
        assert_relative_eq!(state.velocity.x, 1.0);
        assert_relative_eq!(state.distance(), 1.0);
    }

    #[test]
    fn test_to_ecliptic() {
        let eps = mean_obliquity(0.0);
        // a body on the ecliptic, 90° from the equinox, moving towards the ecliptic pole
        let state = StateVector::new(
            10,
            0,
            0.0,
            Vector3::new(0.0, eps.cos(), eps.sin()) * 2.0,
            Vector3::new(0.0, -eps.sin(), eps.cos()) * 0.5,
        );
        let ecliptic = state.to_ecliptic();
        assert_eq!((ecliptic.body, ecliptic.center), (10, 0));
        assert_relative_eq!(ecliptic.position, Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(ecliptic.velocity, Vector3::new(0.0, 0.0, 0.5), epsilon = 1e-15);
        assert_relative_eq!(ecliptic.distance(), state.distance(), max_relative = 1e-15);

        let spherical = ecliptic.spherical();
        assert_relative_eq!(spherical.longitude_degrees(), 90.0, epsilon = 1e-12);
        assert_relative_eq!(spherical.latitude, 0.0, epsilon = 1e-15);
        assert_relative_eq!(spherical.radius, 2.0, max_relative = 1e-15);

        // zero obliquity leaves the state unchanged
        assert_eq!(emb_wrt_ssb().to_ecliptic_with(0.0), emb_wrt_ssb());
    }

    #[test]
    fn test_spherical_of_equatorial_state() {
        // latitude of a position is its declination in the equatorial frame
        let spherical = emb_wrt_ssb().spherical();
        let position = emb_wrt_ssb().position;
        assert_relative_eq!(
            spherical.latitude.sin(),
            position.z / position.norm(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            spherical.longitude.tan(),
            position.y / position.x,
            max_relative = 1e-12
        );
        assert!(spherical.longitude > std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_zero() {
        let zero = StateVector::zero(399, 12.0);
        assert_eq!(zero.distance(), 0.0);
        assert_eq!(zero.speed(), 0.0);
        assert_eq!((zero.body, zero.center), (399, 399));
    }
}
