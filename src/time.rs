//! Time system conversion between calendar time and the continuous ephemeris scale.
//!
//! Kernels are indexed by a **continuous time scale**: uniform seconds past an
//! epoch, free of leap seconds (TDB seconds past J2000 for SPK kernels). Callers
//! usually think in **calendar time**. This module bridges the two:
//!
//! * [`CalendarTime`] – a validated civil date and time of day,
//! * [`TimeConvention`] – the fixed convention (epoch, constant offset, rate)
//!   mapping calendar time onto the continuous scale and back.
//!
//! Calendar arithmetic goes through integer **Julian Day Numbers**. Dates
//! before 1582-10-15 are read in the proleptic Julian calendar, later dates in
//! the Gregorian calendar; the ten days dropped by the reform do not exist.
//!
//! The convention is a constant of the engine: no leap-second table is consulted
//! at run time. A UTC-like calendar is supported through
//! [`TimeConvention::fixed_utc`], which freezes `TAI − UTC` at the value the
//! caller provides.
//!
//! # Example
//! ```rust
//! use ephemeris::time::{CalendarTime, TimeConvention};
//!
//! let convention = TimeConvention::tdb();
//! let noon = CalendarTime::new(2000, 1, 1, 12, 0, 0.0).unwrap();
//! assert_eq!(convention.to_continuous(&noon).unwrap(), 0.0);
//!
//! let back = convention.to_calendar(86_400.0).unwrap();
//! assert_eq!(back.to_string(), "2000-01-02T12:00:00.000");
//! ```

use std::{fmt, str::FromStr};

use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    number::complete::double,
    sequence::{pair, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::constants::{
    EphemerisTime, JulianDate, GREGORIAN_REFORM_JDN, J2000_JD, MAX_CALENDAR_YEAR,
    MIN_CALENDAR_YEAR, SECONDS_PER_DAY, TT_MINUS_TAI,
};
use crate::ephemeris_errors::{EphemerisError, Result};

/// A civil date and time of day.
///
/// Seconds are fractional and lie in `[0, 60)`; the calendar carries no leap
/// seconds since it maps onto a uniform scale through a fixed offset.
///
/// See also
/// ------------
/// * [`TimeConvention::to_continuous`] – Map a calendar time onto the continuous scale.
/// * [`CalendarTime::julian_date`] – Julian Date of the calendar time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f64,
}

impl CalendarTime {
    /// Build a validated calendar time.
    ///
    /// Arguments
    /// -----------------
    /// * `year`: Astronomical year numbering (year 0 exists), in `[-999999, 999999]`.
    /// * `month`: `1..=12`.
    /// * `day`: `1..=days_in_month`, according to the Julian or Gregorian calendar.
    /// * `hour`, `minute`: `0..=23`, `0..=59`.
    /// * `second`: finite, in `[0, 60)`.
    ///
    /// Return
    /// ----------
    /// * The calendar time, or [`EphemerisError::TimeDomain`] if any field is out of range
    ///   or the date falls in the 1582 reform gap.
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: f64) -> Result<Self> {
        let time = CalendarTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        time.validate()?;
        Ok(time)
    }

    /// Midnight at the start of the given date.
    pub fn from_date(year: i32, month: u8, day: u8) -> Result<Self> {
        Self::new(year, month, day, 0, 0, 0.0)
    }

    /// Check every field against the calendar rules.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CALENDAR_YEAR..=MAX_CALENDAR_YEAR).contains(&self.year) {
            return Err(EphemerisError::TimeDomain(format!(
                "year {} outside {MIN_CALENDAR_YEAR}..={MAX_CALENDAR_YEAR}",
                self.year
            )));
        }
        if !(1..=12).contains(&self.month) {
            return Err(EphemerisError::TimeDomain(format!(
                "month {} outside 1..=12",
                self.month
            )));
        }
        if is_reform_gap(self.year, self.month, self.day) {
            return Err(EphemerisError::TimeDomain(format!(
                "{:04}-{:02}-{:02} does not exist (Gregorian reform)",
                self.year, self.month, self.day
            )));
        }
        let gregorian = is_gregorian_date(self.year, self.month, self.day);
        let max_day = days_in_month(self.year, self.month, gregorian);
        if self.day < 1 || self.day > max_day {
            return Err(EphemerisError::TimeDomain(format!(
                "day {} outside 1..={max_day} for {:04}-{:02}",
                self.day, self.year, self.month
            )));
        }
        if self.hour > 23 || self.minute > 59 {
            return Err(EphemerisError::TimeDomain(format!(
                "time of day {:02}:{:02} is invalid",
                self.hour, self.minute
            )));
        }
        if !self.second.is_finite() || !(0.0..60.0).contains(&self.second) {
            return Err(EphemerisError::TimeDomain(format!(
                "second {} outside [0, 60)",
                self.second
            )));
        }
        Ok(())
    }

    /// Julian Day Number of the civil day (the JD at noon of that day).
    pub fn julian_day_number(&self) -> Result<i64> {
        self.validate()?;
        let gregorian = is_gregorian_date(self.year, self.month, self.day);
        Ok(jdn_from_date(self.year, self.month, self.day, gregorian))
    }

    /// Seconds elapsed since midnight.
    pub fn seconds_of_day(&self) -> f64 {
        f64::from(self.hour) * 3600.0 + f64::from(self.minute) * 60.0 + self.second
    }

    /// Julian Date of this calendar time, on the same scale as the calendar.
    pub fn julian_date(&self) -> Result<JulianDate> {
        let jdn = self.julian_day_number()?;
        Ok(jdn as f64 - 0.5 + self.seconds_of_day() / SECONDS_PER_DAY)
    }

    /// Calendar time of a Julian Date.
    ///
    /// Arguments
    /// -----------------
    /// * `jd`: Julian Date; must be finite and map to a year in `[-999999, 999999]`.
    ///
    /// Return
    /// ----------
    /// * The calendar time, or [`EphemerisError::TimeDomain`].
    pub fn from_julian_date(jd: JulianDate) -> Result<Self> {
        if !jd.is_finite() {
            return Err(EphemerisError::TimeDomain(format!(
                "Julian Date {jd} is not finite"
            )));
        }
        let shifted = jd + 0.5;
        let jdn = shifted.floor();
        let seconds = (shifted - jdn) * SECONDS_PER_DAY;
        from_day_and_seconds(jdn, seconds)
    }
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:06.3}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` or the same with a space separator.
/// Negative years are written with a leading `-`.
fn parse_calendar(input: &str) -> IResult<&str, (i32, u8, u8, Option<(u8, u8, f64)>)> {
    let (input, year) = map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i32>()
    })(input)?;
    let (input, _) = char('-')(input)?;
    let (input, month) = map_res(digit1, |s: &str| s.parse::<u8>())(input)?;
    let (input, _) = char('-')(input)?;
    let (input, day) = map_res(digit1, |s: &str| s.parse::<u8>())(input)?;
    let (input, time) = opt(tuple((
        one_of("T "),
        map_res(digit1, |s: &str| s.parse::<u8>()),
        char(':'),
        map_res(digit1, |s: &str| s.parse::<u8>()),
        char(':'),
        double,
    )))(input)?;
    Ok((
        input,
        (
            year,
            month,
            day,
            time.map(|(_, hour, _, minute, _, second)| (hour, minute, second)),
        ),
    ))
}

impl FromStr for CalendarTime {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self> {
        let (_, (year, month, day, time)) = all_consuming(parse_calendar)(s.trim())
            .map_err(|e| EphemerisError::TimeDomain(format!("cannot parse '{s}': {e}")))?;
        let (hour, minute, second) = time.unwrap_or((0, 0, 0.0));
        CalendarTime::new(year, month, day, hour, minute, second)
    }
}

/// Fixed convention mapping calendar time onto the continuous scale.
///
/// `continuous = (JD(calendar) − epoch_jd) × 86400 × rate + offset_seconds`
///
/// * `epoch_jd` – Julian Date (on the calendar scale) of continuous time zero.
/// * `offset_seconds` – constant added after scaling, e.g. `TAI − UTC + 32.184`
///   to go from a frozen-UTC calendar to TT ≈ TDB.
/// * `rate` – scale factor between calendar seconds and continuous seconds.
///
/// The default is [`TimeConvention::tdb`]. Missing fields fall back to that
/// default when deserialized.
///
/// See also
/// ------------
/// * [`TimeConvention::to_continuous`] / [`TimeConvention::to_calendar`] – The conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConvention {
    pub epoch_jd: JulianDate,
    pub offset_seconds: f64,
    pub rate: f64,
}

impl Default for TimeConvention {
    fn default() -> Self {
        Self::tdb()
    }
}

impl TimeConvention {
    /// Calendar time already expressed in TDB, continuous time in seconds past J2000.
    /// This is the convention of NAIF SPK kernels.
    pub fn tdb() -> Self {
        TimeConvention {
            epoch_jd: J2000_JD,
            offset_seconds: 0.0,
            rate: 1.0,
        }
    }

    /// Calendar time read as UTC with `TAI − UTC` frozen at `leap_seconds`.
    ///
    /// The continuous scale is TT seconds past J2000, which stays within 2 ms of TDB.
    pub fn fixed_utc(leap_seconds: f64) -> Self {
        TimeConvention {
            epoch_jd: J2000_JD,
            offset_seconds: leap_seconds + TT_MINUS_TAI,
            rate: 1.0,
        }
    }

    fn check(&self) -> Result<()> {
        if !self.epoch_jd.is_finite() || !self.offset_seconds.is_finite() {
            return Err(EphemerisError::TimeDomain(format!(
                "time convention has non-finite epoch or offset: {self:?}"
            )));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(EphemerisError::TimeDomain(format!(
                "time convention rate must be positive, got {}",
                self.rate
            )));
        }
        Ok(())
    }

    /// Convert a calendar time to continuous seconds.
    ///
    /// Arguments
    /// -----------------
    /// * `calendar`: The calendar time to convert.
    ///
    /// Return
    /// ----------
    /// * Continuous seconds past the epoch, or [`EphemerisError::TimeDomain`] if the
    ///   calendar time or the convention is invalid.
    ///
    /// See also
    /// ------------
    /// * [`Self::to_calendar`] – Inverse conversion.
    pub fn to_continuous(&self, calendar: &CalendarTime) -> Result<EphemerisTime> {
        self.check()?;
        let jdn = calendar.julian_day_number()?;
        // Day part first so that whole days stay exact.
        let days = jdn as f64 - 0.5 - self.epoch_jd;
        let elapsed = days * SECONDS_PER_DAY + calendar.seconds_of_day();
        Ok(elapsed * self.rate + self.offset_seconds)
    }

    /// Convert continuous seconds back to a calendar time.
    ///
    /// Arguments
    /// -----------------
    /// * `et`: Continuous seconds past the epoch.
    ///
    /// Return
    /// ----------
    /// * The calendar time, or [`EphemerisError::TimeDomain`] if `et` is not finite or
    ///   falls outside the years `[-999999, 999999]`.
    ///
    /// See also
    /// ------------
    /// * [`Self::to_continuous`] – Forward conversion.
    pub fn to_calendar(&self, et: EphemerisTime) -> Result<CalendarTime> {
        self.check()?;
        if !et.is_finite() {
            return Err(EphemerisError::TimeDomain(format!(
                "continuous time {et} is not finite"
            )));
        }
        let elapsed = (et - self.offset_seconds) / self.rate;

        let shifted_epoch = self.epoch_jd + 0.5;
        let epoch_day = shifted_epoch.floor();
        let epoch_seconds = (shifted_epoch - epoch_day) * SECONDS_PER_DAY;

        let total = epoch_seconds + elapsed;
        let days = (total / SECONDS_PER_DAY).floor();
        from_day_and_seconds(epoch_day + days, total - days * SECONDS_PER_DAY)
    }

    /// Continuous seconds of a Julian Date expressed on the calendar scale.
    pub fn jd_to_continuous(&self, jd: JulianDate) -> Result<EphemerisTime> {
        self.check()?;
        if !jd.is_finite() {
            return Err(EphemerisError::TimeDomain(format!(
                "Julian Date {jd} is not finite"
            )));
        }
        Ok((jd - self.epoch_jd) * SECONDS_PER_DAY * self.rate + self.offset_seconds)
    }

    /// Julian Date on the calendar scale of continuous seconds.
    pub fn continuous_to_jd(&self, et: EphemerisTime) -> Result<JulianDate> {
        self.check()?;
        if !et.is_finite() {
            return Err(EphemerisError::TimeDomain(format!(
                "continuous time {et} is not finite"
            )));
        }
        Ok(self.epoch_jd + (et - self.offset_seconds) / self.rate / SECONDS_PER_DAY)
    }
}

/// Build a calendar time from a (possibly unnormalized) Julian Day Number and
/// seconds since the midnight opening that day.
fn from_day_and_seconds(jdn: f64, seconds: f64) -> Result<CalendarTime> {
    let (mut jdn, mut seconds) = (jdn, seconds);
    if seconds < 0.0 {
        jdn -= 1.0;
        seconds += SECONDS_PER_DAY;
    } else if seconds >= SECONDS_PER_DAY {
        jdn += 1.0;
        seconds -= SECONDS_PER_DAY;
    }

    let min_jdn = jdn_from_date(MIN_CALENDAR_YEAR, 1, 1, false) as f64;
    let max_jdn = jdn_from_date(MAX_CALENDAR_YEAR, 12, 31, true) as f64;
    if !(min_jdn..=max_jdn).contains(&jdn) {
        return Err(EphemerisError::TimeDomain(format!(
            "Julian Day Number {jdn} outside the representable calendar"
        )));
    }

    let (year, month, day) = date_from_jdn(jdn as i64);
    let whole = seconds.floor();
    let whole_u = whole as u32;
    Ok(CalendarTime {
        year,
        month,
        day,
        hour: (whole_u / 3600) as u8,
        minute: ((whole_u % 3600) / 60) as u8,
        second: f64::from(whole_u % 60) + (seconds - whole),
    })
}

fn is_reform_gap(year: i32, month: u8, day: u8) -> bool {
    year == 1582 && month == 10 && (5..=14).contains(&day)
}

fn is_gregorian_date(year: i32, month: u8, day: u8) -> bool {
    (year, month, day) >= (1582, 10, 15)
}

fn is_leap_year(year: i32, gregorian: bool) -> bool {
    if gregorian {
        (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
    } else {
        year.rem_euclid(4) == 0
    }
}

fn days_in_month(year: i32, month: u8, gregorian: bool) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year, gregorian) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Julian Day Number of a civil date.
///
/// Floor division keeps the count valid before JDN 0 (-4712-01-01), where
/// day numbers go negative.
fn jdn_from_date(year: i32, month: u8, day: u8, gregorian: bool) -> i64 {
    let a = (14 - i64::from(month)) / 12;
    let y = i64::from(year) + 4800 - a;
    let m = i64::from(month) + 12 * a - 3;
    let base = i64::from(day) + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4);
    if gregorian {
        base - y.div_euclid(100) + y.div_euclid(400) - 32045
    } else {
        base - 32083
    }
}

/// Civil date of a Julian Day Number (Richards' algorithm, floor division).
fn date_from_jdn(jdn: i64) -> (i32, u8, u8) {
    let mut f = jdn + 1401;
    if jdn >= GREGORIAN_REFORM_JDN {
        f += (((4 * jdn + 274_277) / 146_097) * 3) / 4 - 38;
    }
    let e = 4 * f + 3;
    let g = e.rem_euclid(1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = ((h / 153 + 2) % 12) + 1;
    let year = e.div_euclid(1461) - 4716 + (12 + 2 - month) / 12;
    (year as i32, month as u8, day as u8)
}
