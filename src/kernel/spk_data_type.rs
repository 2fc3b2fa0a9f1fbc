//! SPK segment data types.
//!
//! Every SPK summary declares how its segment data is laid out. Only
//! [`SpkDataType::Chebyshev`] (type 2, Chebyshev polynomials for position,
//! velocity obtained by differentiation) is evaluated by this crate; the others
//! are recognized so they can be named in diagnostics.

use std::fmt;

use crate::ephemeris_errors::EphemerisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SpkDataType {
    ModifiedDifferenceArray = 1,
    Chebyshev = 2,
    ChebyshevPositionVelocity = 3,
    DiscreteStates = 5,
    EquallySpacedLagrange = 8,
    UnequallySpacedLagrange = 9,
    SpaceCommandTwoLine = 10,
    HermiteUniform = 12,
    HermiteNonUniform = 13,
    ChebyshevNonUniform = 14,
    PrecessingConic = 15,
    Equinoctial = 17,
    EsaHermiteLagrange = 18,
    EsaPiecewise = 19,
    ChebyshevVelocity = 20,
    ExtendedModifiedDifferenceArray = 21,
}

impl SpkDataType {
    /// `true` for the data types this crate can evaluate.
    pub fn is_supported(self) -> bool {
        self == SpkDataType::Chebyshev
    }

    /// Check a raw type code and return it only if it can be evaluated.
    ///
    /// Return
    /// ----------
    /// * The supported data type, or [`EphemerisError::UnsupportedSpkType`] carrying the raw code.
    pub fn supported(code: i32) -> Result<Self, EphemerisError> {
        match SpkDataType::try_from(code) {
            Ok(data_type) if data_type.is_supported() => Ok(data_type),
            _ => Err(EphemerisError::UnsupportedSpkType(code)),
        }
    }
}

impl TryFrom<i32> for SpkDataType {
    type Error = EphemerisError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        use SpkDataType::*;
        Ok(match code {
            1 => ModifiedDifferenceArray,
            2 => Chebyshev,
            3 => ChebyshevPositionVelocity,
            5 => DiscreteStates,
            8 => EquallySpacedLagrange,
            9 => UnequallySpacedLagrange,
            10 => SpaceCommandTwoLine,
            12 => HermiteUniform,
            13 => HermiteNonUniform,
            14 => ChebyshevNonUniform,
            15 => PrecessingConic,
            17 => Equinoctial,
            18 => EsaHermiteLagrange,
            19 => EsaPiecewise,
            20 => ChebyshevVelocity,
            21 => ExtendedModifiedDifferenceArray,
            _ => return Err(EphemerisError::UnsupportedSpkType(code)),
        })
    }
}

impl From<SpkDataType> for i32 {
    fn from(data_type: SpkDataType) -> Self {
        data_type as i32
    }
}

impl fmt::Display for SpkDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SpkDataType::*;
        let name = match self {
            ModifiedDifferenceArray => "Modified Difference Array",
            Chebyshev => "Chebyshev (position only)",
            ChebyshevPositionVelocity => "Chebyshev (position and velocity)",
            DiscreteStates => "Discrete states (two-body propagation)",
            EquallySpacedLagrange => "Lagrange interpolation (equal time steps)",
            UnequallySpacedLagrange => "Lagrange interpolation (unequal time steps)",
            SpaceCommandTwoLine => "Space Command two-line elements",
            HermiteUniform => "Hermite interpolation (equal time steps)",
            HermiteNonUniform => "Hermite interpolation (unequal time steps)",
            ChebyshevNonUniform => "Chebyshev (unequal time steps)",
            PrecessingConic => "Precessing conic propagation",
            Equinoctial => "Equinoctial elements",
            EsaHermiteLagrange => "ESOC/DDID Hermite/Lagrange interpolation",
            EsaPiecewise => "ESOC/DDID piecewise interpolation",
            ChebyshevVelocity => "Chebyshev (velocity only)",
            ExtendedModifiedDifferenceArray => "Extended Modified Difference Array",
        };
        write!(f, "{name} [type {}]", *self as i32)
    }
}

#[cfg(test)]
mod test_spk_data_type {
    use super::*;

    #[test]
    fn test_supported() {
        assert_eq!(SpkDataType::supported(2).unwrap(), SpkDataType::Chebyshev);
        assert_eq!(
            SpkDataType::supported(3).unwrap_err(),
            EphemerisError::UnsupportedSpkType(3)
        );
        assert_eq!(
            SpkDataType::supported(42).unwrap_err(),
            EphemerisError::UnsupportedSpkType(42)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SpkDataType::Chebyshev.to_string(),
            "Chebyshev (position only) [type 2]"
        );
        assert_eq!(i32::from(SpkDataType::Equinoctial), 17);
    }
}
