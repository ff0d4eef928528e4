//! OLE variant time <-> calendar timestamp conversion with milliseconds.
//!
//! A variant time (`DATE`) is an `f64` day count where `0.0` is 1899-12-30
//! 00:00 and the fraction is the time of day. For negative values the
//! fraction still counts forward from midnight, so `-1.25` is 1899-12-29
//! 06:00, not 1899-12-28 18:00.
//!
//! The platform conversion (`VariantTimeToSystemTime`) works in whole seconds
//! and rounds to the nearest one, which loses milliseconds. The conversions
//! here use a second-resolution primary path with the same contract and
//! recover the milliseconds separately:
//!
//! - [`to_calendar`] runs the primary conversion half a second early (so the
//!   rounding truncates instead), recomputes milliseconds from the fractional
//!   day, and falls back to the unshifted primary conversion when the
//!   recomputed value is zero.
//! - [`to_variant`] converts with milliseconds zeroed and adds them back as a
//!   day fraction.
//!
//! Both work on the linear day value internally, so dates before 1899-12-30
//! go through the same arithmetic as later ones.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{ComutilError, Result};

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// One second expressed in days.
pub const ONE_SECOND: f64 = 1.0 / SECONDS_PER_DAY;

const HALF_SECOND: f64 = ONE_SECOND / 2.0;

/// `num_days_from_ce` of 1899-12-30.
const EPOCH_DAYS_FROM_CE: i64 = 693_594;

/// Earliest supported year.
pub const MIN_YEAR: u16 = 100;

/// Latest supported year.
pub const MAX_YEAR: u16 = 9999;

/// Linear day value of 0100-01-01 00:00:00.
const MIN_LINEAR: f64 = -657_434.0;

/// Linear day value of 10000-01-01 00:00:00 (exclusive bound).
const MAX_LINEAR: f64 = 2_958_466.0;

/// OLE automation date.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct VariantTime(f64);

impl VariantTime {
    /// 1899-12-30 00:00:00.
    pub const EPOCH: Self = Self(0.0);

    /// Wrap a raw `DATE` value. Range is checked on conversion.
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw `DATE` value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Day count on a continuous axis (fraction always counts forward).
    fn to_linear(self) -> f64 {
        if self.0 >= 0.0 {
            self.0
        } else {
            let day = self.0.trunc();
            day - (self.0 - day)
        }
    }

    fn from_linear(linear: f64) -> Self {
        if linear >= 0.0 {
            return Self(linear);
        }
        let day = linear.floor();
        let fraction = linear - day;
        Self(day - fraction)
    }
}

impl From<f64> for VariantTime {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<VariantTime> for f64 {
    fn from(value: VariantTime) -> Self {
        value.0
    }
}

impl fmt::Display for VariantTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar timestamp with millisecond precision.
///
/// The weekday is derived from the date and always consistent with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarTimestamp {
    year: u16,
    month: u16,
    day: u16,
    hour: u16,
    minute: u16,
    second: u16,
    millisecond: u16,
    weekday: Weekday,
}

impl CalendarTimestamp {
    /// Create a timestamp, validating every field.
    ///
    /// Fails with [`ComutilError::Range`] for impossible dates or times. Years
    /// outside the variant time range are accepted here and rejected by
    /// [`to_variant`].
    pub fn new(
        year: u16,
        month: u16,
        day: u16,
        hour: u16,
        minute: u16,
        second: u16,
        millisecond: u16,
    ) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .ok_or_else(|| ComutilError::range(format!("invalid date {year:04}-{month:02}-{day:02}")))?;

        if hour > 23 || minute > 59 || second > 59 {
            return Err(ComutilError::range(format!(
                "invalid time {hour:02}:{minute:02}:{second:02}"
            )));
        }
        if millisecond > 999 {
            return Err(ComutilError::range(format!("invalid millisecond {millisecond}")));
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            weekday: date.weekday(),
        })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u16 {
        self.month
    }

    pub fn day(&self) -> u16 {
        self.day
    }

    pub fn hour(&self) -> u16 {
        self.hour
    }

    pub fn minute(&self) -> u16 {
        self.minute
    }

    pub fn second(&self) -> u16 {
        self.second
    }

    pub fn millisecond(&self) -> u16 {
        self.millisecond
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Day of week with Sunday = 0, as in `SYSTEMTIME::wDayOfWeek`.
    pub fn day_of_week(&self) -> u16 {
        self.weekday.num_days_from_sunday() as u16
    }

    /// Same timestamp with a different millisecond value.
    pub fn with_millisecond(self, millisecond: u16) -> Result<Self> {
        if millisecond > 999 {
            return Err(ComutilError::range(format!("invalid millisecond {millisecond}")));
        }
        Ok(Self {
            millisecond,
            ..self
        })
    }

    fn from_date(date: NaiveDate, seconds_of_day: u32) -> Result<Self> {
        let year = u16::try_from(date.year())
            .ok()
            .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
            .ok_or_else(|| ComutilError::range(format!("year {} is out of range", date.year())))?;

        Ok(Self {
            year,
            month: date.month() as u16,
            day: date.day() as u16,
            hour: (seconds_of_day / 3600) as u16,
            minute: (seconds_of_day % 3600 / 60) as u16,
            second: (seconds_of_day % 60) as u16,
            millisecond: 0,
            weekday: date.weekday(),
        })
    }
}

impl fmt::Display for CalendarTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond
        )
    }
}

/// Convert a variant time to a calendar timestamp, keeping milliseconds.
///
/// Fails with [`ComutilError::Range`] for non-finite values and dates outside
/// 0100-01-01 through 9999-12-31.
pub fn to_calendar(time: VariantTime) -> Result<CalendarTimestamp> {
    let linear = time.to_linear();
    if !linear.is_finite() || !(MIN_LINEAR..MAX_LINEAR).contains(&linear) {
        return Err(ComutilError::range(format!("variant time {} is out of range", time)));
    }

    let millisecond = fractional_milliseconds(linear);
    if millisecond == 0 {
        // nothing to recover; the shift would only bias a whole second
        return primary_to_calendar(linear);
    }

    let shifted = primary_to_calendar(linear - HALF_SECOND)?;
    shifted.with_millisecond(millisecond)
}

/// Convert a calendar timestamp to a variant time, keeping milliseconds.
///
/// Fails with [`ComutilError::Range`] for years outside 100 through 9999.
pub fn to_variant(timestamp: &CalendarTimestamp) -> Result<VariantTime> {
    let without_millis = primary_to_linear(timestamp)?;
    let linear = without_millis + ONE_SECOND * f64::from(timestamp.millisecond) / 1000.0;
    Ok(VariantTime::from_linear(linear))
}

/// Millisecond component recovered from the fractional day, or 0 when the
/// value is indistinguishable from a whole second.
fn fractional_milliseconds(linear: f64) -> u16 {
    let fraction = linear - linear.floor();
    let hours = fraction * 24.0;
    let minutes = (hours - hours.floor()) * 60.0;
    let seconds = (minutes - minutes.floor()) * 60.0;
    let millis = ((seconds - seconds.floor()) * 1000.0).round();

    // 0.0000x and 999.9999 are representation noise around a whole second
    if (1.0..=999.0).contains(&millis) {
        millis as u16
    } else {
        0
    }
}

/// Second-resolution conversion, rounding to the nearest second.
fn primary_to_calendar(linear: f64) -> Result<CalendarTimestamp> {
    let total_seconds = (linear * SECONDS_PER_DAY).round() as i64;
    let days = total_seconds.div_euclid(86_400);
    let seconds_of_day = total_seconds.rem_euclid(86_400) as u32;

    let date = i32::try_from(EPOCH_DAYS_FROM_CE + days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| ComutilError::range(format!("day offset {} is out of range", days)))?;

    CalendarTimestamp::from_date(date, seconds_of_day)
}

/// Second-resolution conversion ignoring the millisecond field.
fn primary_to_linear(timestamp: &CalendarTimestamp) -> Result<f64> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&timestamp.year) {
        return Err(ComutilError::range(format!(
            "year {} is outside {}..={}",
            timestamp.year, MIN_YEAR, MAX_YEAR
        )));
    }

    let date = NaiveDate::from_ymd_opt(
        i32::from(timestamp.year),
        u32::from(timestamp.month),
        u32::from(timestamp.day),
    )
    .ok_or_else(|| ComutilError::range(format!("invalid date in {}", timestamp)))?;

    let days = i64::from(date.num_days_from_ce()) - EPOCH_DAYS_FROM_CE;
    let seconds = u32::from(timestamp.hour) * 3600
        + u32::from(timestamp.minute) * 60
        + u32::from(timestamp.second);

    Ok(days as f64 + f64::from(seconds) / SECONDS_PER_DAY)
}

#[cfg(windows)]
mod system_time {
    use super::CalendarTimestamp;
    use crate::error::ComutilError;
    use windows::Win32::Foundation::SYSTEMTIME;

    impl From<CalendarTimestamp> for SYSTEMTIME {
        fn from(ts: CalendarTimestamp) -> Self {
            SYSTEMTIME {
                wYear: ts.year(),
                wMonth: ts.month(),
                wDayOfWeek: ts.day_of_week(),
                wDay: ts.day(),
                wHour: ts.hour(),
                wMinute: ts.minute(),
                wSecond: ts.second(),
                wMilliseconds: ts.millisecond(),
            }
        }
    }

    impl TryFrom<SYSTEMTIME> for CalendarTimestamp {
        type Error = ComutilError;

        // wDayOfWeek is ignored on input, as SystemTimeToVariantTime does
        fn try_from(st: SYSTEMTIME) -> Result<Self, Self::Error> {
            CalendarTimestamp::new(
                st.wYear,
                st.wMonth,
                st.wDay,
                st.wHour,
                st.wMinute,
                st.wSecond,
                st.wMilliseconds,
            )
        }
    }
}
