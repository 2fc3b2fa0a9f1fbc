//! Ecliptic and spherical views of equatorial states.
//!
//! Kernels store states in an equatorial frame (J2000 equator for SPK frame 1).
//! The ecliptic frame shares its x axis (the equinox) and is tilted about it by
//! the **obliquity of the ecliptic** ε:
//!
//! ```text
//! x_ecl = x
//! y_ecl =  y·cos ε + z·sin ε
//! z_ecl = −y·sin ε + z·cos ε
//! ```
//!
//! [`mean_obliquity`] gives ε from the IAU 2006 polynomial. Rotating by ε at
//! J2000 gives the J2000 ecliptic; rotating by ε at another date only tilts the
//! plane and applies no precession.
//!
//! [`SphericalCoordinates`] expresses a position as longitude, latitude and
//! radius in whichever frame the position is given.

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{Rotation3, Vector3};

use crate::constants::{EphemerisTime, RADSEC, SECONDS_PER_JULIAN_CENTURY};

/// Mean obliquity of the ecliptic (IAU 2006), in radians.
///
/// ```text
/// ε(T) = 84381.406″ − 46.836769″·T − 0.0001831″·T² + 0.00200340″·T³
///        − 0.000000576″·T⁴ − 0.0000434″·T⁵
/// ```
///
/// Arguments
/// -----------------
/// * `et`: TDB seconds past J2000; `T` is that time in Julian centuries.
///
/// Return
/// ----------
/// * The obliquity in radians.
///
/// See also
/// ------------
/// * [`equatorial_to_ecliptic`] – Rotation built from this angle.
pub fn mean_obliquity(et: EphemerisTime) -> f64 {
    let t = et / SECONDS_PER_JULIAN_CENTURY;
    let arcsec =
        ((((-0.000_043_4 * t - 0.000_000_576) * t + 0.002_003_40) * t - 0.000_183_1) * t
            - 46.836_769)
            * t
            + 84_381.406;
    arcsec * RADSEC
}

/// Rotation taking equatorial coordinates to ecliptic coordinates.
///
/// This is the rotation of the vector about the x axis by `-obliquity`.
pub fn equatorial_to_ecliptic(obliquity: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), -obliquity)
}

/// Position as longitude, latitude and distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoordinates {
    /// Angle from the x axis in the xy plane, in `[0, 2π)` radians.
    pub longitude: f64,
    /// Angle above the xy plane, in `[-π/2, π/2]` radians.
    pub latitude: f64,
    /// Distance from the center, in the position unit.
    pub radius: f64,
}

impl SphericalCoordinates {
    /// Spherical coordinates of a cartesian position.
    ///
    /// The zero vector maps to longitude and latitude 0.
    pub fn from_cartesian(position: &Vector3<f64>) -> Self {
        let radius = position.norm();
        if radius == 0.0 {
            return SphericalCoordinates {
                longitude: 0.0,
                latitude: 0.0,
                radius,
            };
        }
        SphericalCoordinates {
            longitude: position.y.atan2(position.x).rem_euclid(TAU),
            latitude: (position.z / radius).clamp(-1.0, 1.0).asin(),
            radius,
        }
    }

    pub fn to_cartesian(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        self.radius * Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

impl fmt::Display for SphericalCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon {:>11.7}°  lat {:>+11.7}°  r {:.9e}",
            self.longitude_degrees(),
            self.latitude_degrees(),
            self.radius
        )
    }
}

#[cfg(test)]
mod test_ecliptic {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_mean_obliquity() {
        assert_relative_eq!(mean_obliquity(0.0), 84_381.406 * RADSEC, max_relative = 1e-15);
        assert_relative_eq!(
            mean_obliquity(0.0).to_degrees(),
            23.439_279_444,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            mean_obliquity(SECONDS_PER_JULIAN_CENTURY),
            84_334.571_050_68 * RADSEC,
            max_relative = 1e-12
        );
        // the obliquity decreases by about 47″ per century
        assert!(mean_obliquity(-SECONDS_PER_JULIAN_CENTURY) > mean_obliquity(0.0));
    }

    #[test]
    fn test_rotation_axes() {
        let eps = mean_obliquity(0.0);
        let rotation = equatorial_to_ecliptic(eps);

        let equinox = Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotation * equinox, equinox, epsilon = 1e-15);

        let ecliptic_y = Vector3::new(0.0, eps.cos(), eps.sin());
        let rotated = rotation * ecliptic_y;
        assert_relative_eq!(rotated, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-15);

        let ecliptic_pole = Vector3::new(0.0, -eps.sin(), eps.cos());
        let rotated = rotation * ecliptic_pole;
        assert_relative_eq!(rotated, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_spherical() {
        let west = SphericalCoordinates::from_cartesian(&Vector3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(west.longitude, PI);
        assert_eq!(west.latitude, 0.0);

        let south_east = SphericalCoordinates::from_cartesian(&Vector3::new(1.0, -1.0, 0.0));
        assert_relative_eq!(south_east.longitude, 1.75 * PI);
        assert_relative_eq!(south_east.radius, 2f64.sqrt());

        let pole = SphericalCoordinates::from_cartesian(&Vector3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(pole.latitude, FRAC_PI_2);
        assert_eq!(pole.radius, 2.0);

        let origin = SphericalCoordinates::from_cartesian(&Vector3::zeros());
        assert_eq!((origin.longitude, origin.latitude, origin.radius), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_spherical_to_cartesian() {
        let position = Vector3::new(-2.6e7, 1.3e8, -5.6e7);
        let spherical = SphericalCoordinates::from_cartesian(&position);
        assert!((0.0..TAU).contains(&spherical.longitude));
        assert!(spherical.latitude < 0.0);
        assert_relative_eq!(spherical.to_cartesian(), position, max_relative = 1e-14);
    }
}
