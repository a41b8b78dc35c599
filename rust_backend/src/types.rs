//! Value types crossing the boundary.
//!
//! Fixed-size engine buffers are modelled as fixed-length arrays so that the
//! buffer-size contract of every operation is carried by the type itself.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use sweph_sys as sys;

/// Continuous time axis shared by every date-dependent operation.
pub type JulianDay = f64;

/// `[lon, lat, dist, speed_lon, speed_lat, speed_dist]`
pub type CelestialPosition = [f64; sys::POSITION_LEN];

/// Contact/extremum instants of an eclipse; slot meaning is defined by the engine.
pub type EclipseTimings = [f64; sys::ECLIPSE_TIMES_LEN];

/// House cusps; index 0 is unused, 1..=12 are the cusps.
pub type HouseCusps = [f64; sys::HOUSE_CUSPS_LEN];

/// Asc, MC, ARMC, Vertex, equatorial Asc, co-Asc (Koch), co-Asc (Munkasey),
/// polar Asc, two reserved slots.
pub type AngleSet = [f64; sys::ASCMC_LEN];

/// Calendar system selector passed to the calendar conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarSystem {
    Julian,
    Gregorian,
}

impl CalendarSystem {
    /// Map the engine's integer flag. Anything but `SE_GREG_CAL` selects the
    /// Julian calendar, which is how the engine itself reads the flag.
    pub fn from_flag(flag: i32) -> Self {
        if flag == sys::SE_GREG_CAL {
            Self::Gregorian
        } else {
            Self::Julian
        }
    }

    pub fn flag(self) -> i32 {
        match self {
            Self::Julian => sys::SE_JUL_CAL,
            Self::Gregorian => sys::SE_GREG_CAL,
        }
    }
}

impl Default for CalendarSystem {
    fn default() -> Self {
        Self::Gregorian
    }
}

/// Calendar date with fractional hour, as produced by reverse conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: f64,
}

impl CalendarDate {
    pub fn new(year: i32, month: i32, day: i32, hour: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }

    /// Build from a chrono timestamp (proleptic Gregorian).
    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        let seconds = dt.num_seconds_from_midnight() as f64
            + dt.nanosecond() as f64 / 1_000_000_000.0;
        Self {
            year: dt.year(),
            month: dt.month() as i32,
            day: dt.day() as i32,
            hour: seconds / 3600.0,
        }
    }

    /// Convert to a chrono timestamp, rounding to the nearest microsecond.
    ///
    /// Only meaningful for Gregorian dates; returns `None` when the fields do
    /// not form a valid date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        if !(0.0..24.0).contains(&self.hour) {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(
            self.year,
            u32::try_from(self.month).ok()?,
            u32::try_from(self.day).ok()?,
        )?;
        let micros = (self.hour * 3_600_000_000.0).round() as i64;
        date.and_hms_opt(0, 0, 0)?
            .checked_add_signed(chrono::Duration::microseconds(micros))
    }
}

/// Result of a position computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionResult {
    pub position: CelestialPosition,
    /// Flags actually used by the engine; may differ from the requested ones.
    pub flags: i32,
}

/// Result of an eclipse search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseResult {
    /// `SE_ECL_*` bits describing the eclipse found.
    pub eclipse_type: i32,
    pub times: EclipseTimings,
}

/// Result of a house computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseResult {
    pub cusps: HouseCusps,
    pub ascmc: AngleSet,
}
