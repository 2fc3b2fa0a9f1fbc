//! # Constants and type definitions for the ephemeris engine
//!
//! This module centralizes the **time constants**, **unit conversion factors**
//! and the **binary layout constants** of the kernel formats understood by the
//! crate.
//!
//! ## Overview
//!
//! - Time scale constants (J2000 epoch, seconds per day, TT−TAI offset)
//! - Unit conversions (km ↔ AU, arcseconds → radians)
//! - Native `EPHKERNL` layout (magic, header and directory sizes)
//! - NAIF DAF layout (record size, SPK summary shape)
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Time and unit constants
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00 TDB)
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian Day Number of the J2000.0 civil day
pub const J2000_JDN: i64 = 2_451_545;

/// Number of seconds in a Julian century
pub const SECONDS_PER_JULIAN_CENTURY: f64 = 36_525.0 * SECONDS_PER_DAY;

/// Radians per arcsecond
pub const RADSEC: f64 = std::f64::consts::PI / 648_000.0;

/// TT − TAI, in seconds
pub const TT_MINUS_TAI: f64 = 32.184;

/// First Julian Day Number of the Gregorian calendar (1582-10-15)
pub const GREGORIAN_REFORM_JDN: i64 = 2_299_161;

/// Smallest calendar year accepted by the time converter (about -3.2e13 s from J2000)
pub const MIN_CALENDAR_YEAR: i32 = -999_999;

/// Largest calendar year accepted by the time converter
pub const MAX_CALENDAR_YEAR: i32 = 999_999;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

// -------------------------------------------------------------------------------------------------
// Native kernel layout
// -------------------------------------------------------------------------------------------------

/// Magic bytes opening a native kernel
pub const NATIVE_MAGIC: &[u8; 8] = b"EPHKERNL";

/// Native format version written and accepted by this crate
pub const NATIVE_VERSION: u32 = 1;

/// Size in bytes of the native header
pub const NATIVE_HEADER_SIZE: usize = 40;

/// Size in bytes of one native directory record
pub const NATIVE_DIRECTORY_RECORD_SIZE: usize = 48;

/// Default frame identifier (J2000 equator, as in NAIF frame 1)
pub const DEFAULT_FRAME_ID: i32 = 1;

// -------------------------------------------------------------------------------------------------
// NAIF DAF layout
// -------------------------------------------------------------------------------------------------

/// Size in bytes of one DAF record
pub const DAF_RECORD_SIZE: usize = 1024;

/// Size in bytes of one DAF word (double precision)
pub const DAF_WORD_SIZE: usize = 8;

/// Identification word opening an SPK kernel
pub const DAF_SPK_IDWORD: &str = "DAF/SPK";

/// Number of double precision components in an SPK summary
pub const SPK_ND: i32 = 2;

/// Number of integer components in an SPK summary
pub const SPK_NI: i32 = 6;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Body identifier (NAIF integer code convention)
pub type BodyId = i32;

/// Continuous time, in seconds past the configured epoch (TDB seconds past J2000 by default)
pub type EphemerisTime = f64;

/// Julian Date (days)
pub type JulianDate = f64;
