//! Millisecond-precision wall-clock date-time used by every rule.
//!
//! The value carries no timezone. Conversions to and from zoned values are
//! the job of [`super::DateAdapter`], so the engine never has to reason about
//! DST transitions.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use super::Weekday;
use crate::error::RuleOptionError;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
const MILLIS_PER_WEEK: i64 = 7 * MILLIS_PER_DAY;

/// Calendar unit used for arithmetic and truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl TimeUnit {
    /// Length of the unit in milliseconds, or `None` for calendar-length units.
    #[must_use]
    pub const fn fixed_millis(self) -> Option<i64> {
        match self {
            Self::Year | Self::Month => None,
            Self::Week => Some(MILLIS_PER_WEEK),
            Self::Day => Some(MILLIS_PER_DAY),
            Self::Hour => Some(MILLIS_PER_HOUR),
            Self::Minute => Some(MILLIS_PER_MINUTE),
            Self::Second => Some(MILLIS_PER_SECOND),
            Self::Millisecond => Some(1),
        }
    }
}

/// Readable and settable component of a [`DateTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Year,
    /// 1-12.
    Month,
    /// Day of month, 1-31.
    Day,
    /// Day of year, 1-366.
    Yearday,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl DateField {
    /// The unit one step of this field spans.
    #[must_use]
    pub const fn unit(self) -> TimeUnit {
        match self {
            Self::Year => TimeUnit::Year,
            Self::Month => TimeUnit::Month,
            Self::Day | Self::Yearday => TimeUnit::Day,
            Self::Hour => TimeUnit::Hour,
            Self::Minute => TimeUnit::Minute,
            Self::Second => TimeUnit::Second,
            Self::Millisecond => TimeUnit::Millisecond,
        }
    }
}

/// Immutable wall-clock date-time with millisecond precision.
///
/// Arithmetic saturates at the range chrono can represent instead of
/// panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDateTime", into = "NaiveDateTime")]
pub struct DateTime(NaiveDateTime);

impl DateTime {
    pub const MIN: Self = Self(NaiveDateTime::MIN);
    pub const MAX: Self = Self(NaiveDateTime::MAX);

    /// Wraps a chrono value, dropping precision below one millisecond.
    #[must_use]
    pub fn new(naive: NaiveDateTime) -> Self {
        // Leap-second representations (nanos >= 1e9) collapse onto the last millisecond.
        let millis = (naive.nanosecond() / 1_000_000).min(999);
        Self(naive.with_nanosecond(millis * 1_000_000).unwrap_or(naive))
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|date| Self(date.and_time(NaiveTime::MIN)))
    }

    #[must_use]
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Self)
    }

    #[must_use]
    pub fn from_ymd_hms_milli(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Option<Self> {
        if millisecond > 999 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_milli_opt(hour, minute, second, millisecond)
            .map(Self)
    }

    /// Builds a value from milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        chrono::DateTime::from_timestamp_millis(millis).map(|dt| Self(dt.naive_utc()))
    }

    #[must_use]
    pub const fn naive(self) -> NaiveDateTime {
        self.0
    }

    /// Milliseconds since the Unix epoch, reading the wall-clock as UTC.
    #[must_use]
    pub fn value_of(self) -> i64 {
        self.0.and_utc().timestamp_millis()
    }

    #[must_use]
    pub fn get(self, field: DateField) -> i32 {
        match field {
            DateField::Year => self.0.year(),
            DateField::Month => small(self.0.month()),
            DateField::Day => small(self.0.day()),
            DateField::Yearday => small(self.0.ordinal()),
            DateField::Hour => small(self.0.hour()),
            DateField::Minute => small(self.0.minute()),
            DateField::Second => small(self.0.second()),
            DateField::Millisecond => small(self.millis()),
        }
    }

    /// Returns a copy with `field` set to `value`.
    ///
    /// Out-of-range values overflow into the next unit (day 32 of January is
    /// February 1st). Setting the year or month keeps the day when possible
    /// and clamps it to the end of the month otherwise.
    #[must_use]
    pub fn set(self, field: DateField, value: i32) -> Self {
        let delta = i64::from(value) - i64::from(self.get(field));
        self.add(delta, field.unit())
    }

    #[must_use]
    pub fn weekday(self) -> Weekday {
        Weekday::from_chrono(self.0.weekday())
    }

    /// Adds `amount` units. Year and month arithmetic is calendar-aware,
    /// every other unit is a fixed duration.
    #[must_use]
    pub fn add(self, amount: i64, unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Year => self.shift_months(amount.saturating_mul(12)),
            TimeUnit::Month => self.shift_months(amount),
            TimeUnit::Week => self.shift_millis(amount.saturating_mul(MILLIS_PER_WEEK)),
            TimeUnit::Day => self.shift_millis(amount.saturating_mul(MILLIS_PER_DAY)),
            TimeUnit::Hour => self.shift_millis(amount.saturating_mul(MILLIS_PER_HOUR)),
            TimeUnit::Minute => self.shift_millis(amount.saturating_mul(MILLIS_PER_MINUTE)),
            TimeUnit::Second => self.shift_millis(amount.saturating_mul(MILLIS_PER_SECOND)),
            TimeUnit::Millisecond => self.shift_millis(amount),
        }
    }

    #[must_use]
    pub fn subtract(self, amount: i64, unit: TimeUnit) -> Self {
        self.add(amount.saturating_neg(), unit)
    }

    /// Adds an arbitrary duration.
    #[must_use]
    pub fn add_duration(self, duration: TimeDelta) -> Self {
        self.0.checked_add_signed(duration).map_or(
            if duration < TimeDelta::zero() {
                Self::MIN
            } else {
                Self::MAX
            },
            Self::new,
        )
    }

    /// Truncates to the first millisecond of the enclosing `unit`.
    ///
    /// Weeks begin on `week_start`; the argument is ignored for other units.
    #[must_use]
    pub fn granularity(self, unit: TimeUnit, week_start: Weekday) -> Self {
        let millis = i64::from(self.millis());
        let second = i64::from(self.0.second());
        let minute = i64::from(self.0.minute());
        match unit {
            TimeUnit::Millisecond => self,
            TimeUnit::Second => self.shift_millis(-millis),
            TimeUnit::Minute => self.shift_millis(-(second * MILLIS_PER_SECOND + millis)),
            TimeUnit::Hour => self.shift_millis(
                -(minute * MILLIS_PER_MINUTE + second * MILLIS_PER_SECOND + millis),
            ),
            TimeUnit::Day => Self(self.0.date().and_time(NaiveTime::MIN)),
            TimeUnit::Week => {
                let back = self.weekday().days_since(week_start);
                self.granularity(TimeUnit::Day, week_start)
                    .subtract(i64::from(back), TimeUnit::Day)
            }
            TimeUnit::Month => self
                .granularity(TimeUnit::Day, week_start)
                .subtract(i64::from(self.0.day()) - 1, TimeUnit::Day),
            TimeUnit::Year => self
                .granularity(TimeUnit::Day, week_start)
                .subtract(i64::from(self.0.ordinal()) - 1, TimeUnit::Day),
        }
    }

    /// Last millisecond of the enclosing `unit`.
    #[must_use]
    pub fn end_granularity(self, unit: TimeUnit, week_start: Weekday) -> Self {
        self.granularity(unit, week_start)
            .add(1, unit)
            .subtract(1, TimeUnit::Millisecond)
    }

    #[must_use]
    pub fn days_in_month(self) -> u32 {
        self.end_granularity(TimeUnit::Month, Weekday::Monday).0.day()
    }

    #[must_use]
    pub fn days_in_year(self) -> u32 {
        if NaiveDate::from_ymd_opt(self.0.year(), 2, 29).is_some() {
            366
        } else {
            365
        }
    }

    #[must_use]
    pub fn is_before(self, other: Self) -> bool {
        self < other
    }

    #[must_use]
    pub fn is_after(self, other: Self) -> bool {
        self > other
    }

    #[must_use]
    pub fn is_equal(self, other: Self) -> bool {
        self == other
    }

    #[must_use]
    pub fn is_before_or_equal(self, other: Self) -> bool {
        self <= other
    }

    #[must_use]
    pub fn is_after_or_equal(self, other: Self) -> bool {
        self >= other
    }

    fn millis(self) -> u32 {
        (self.0.nanosecond() / 1_000_000).min(999)
    }

    fn shift_millis(self, millis: i64) -> Self {
        TimeDelta::try_milliseconds(millis)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map_or(if millis < 0 { Self::MIN } else { Self::MAX }, Self)
    }

    fn shift_months(self, months: i64) -> Self {
        let count = u32::try_from(months.unsigned_abs()).ok().map(Months::new);
        let shifted = count.and_then(|count| {
            if months < 0 {
                self.0.checked_sub_months(count)
            } else {
                self.0.checked_add_months(count)
            }
        });
        shifted.map_or(if months < 0 { Self::MIN } else { Self::MAX }, Self)
    }
}

/// Calendar components never exceed a few thousand.
fn small(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<NaiveDateTime> for DateTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::new(naive)
    }
}

impl From<DateTime> for NaiveDateTime {
    fn from(date: DateTime) -> Self {
        date.0
    }
}

impl FromStr for DateTime {
    type Err = RuleOptionError;

    /// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DDTHH:MM` and `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_e| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .or_else(|_e| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
            })
            .map(Self::new)
            .map_err(|err| RuleOptionError::InvalidDate(format!("{s}: {err}")))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3f"))
        }
    }
}
