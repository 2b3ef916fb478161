//! Rule options: the raw input record, its normalized form, and the value
//! types shared by both.

mod normalize;

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::date::{DateTime, TimeUnit, Weekday};
use crate::error::RuleOptionError;

pub use normalize::normalize_options;
pub(crate) use normalize::{BaseOptions, OptionsAccumulator, check_entries, normalize_in_order, sorted};

/// Recurrence frequency, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
    Millisecondly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "YEARLY",
            Self::Monthly => "MONTHLY",
            Self::Weekly => "WEEKLY",
            Self::Daily => "DAILY",
            Self::Hourly => "HOURLY",
            Self::Minutely => "MINUTELY",
            Self::Secondly => "SECONDLY",
            Self::Millisecondly => "MILLISECONDLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "YEARLY" => Self::Yearly,
            "MONTHLY" => Self::Monthly,
            "WEEKLY" => Self::Weekly,
            "DAILY" => Self::Daily,
            "HOURLY" => Self::Hourly,
            "MINUTELY" => Self::Minutely,
            "SECONDLY" => Self::Secondly,
            "MILLISECONDLY" => Self::Millisecondly,
            _ => return None,
        })
    }

    /// The calendar unit one step of this frequency spans.
    #[must_use]
    pub const fn unit(self) -> TimeUnit {
        match self {
            Self::Yearly => TimeUnit::Year,
            Self::Monthly => TimeUnit::Month,
            Self::Weekly => TimeUnit::Week,
            Self::Daily => TimeUnit::Day,
            Self::Hourly => TimeUnit::Hour,
            Self::Minutely => TimeUnit::Minute,
            Self::Secondly => TimeUnit::Second,
            Self::Millisecondly => TimeUnit::Millisecond,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RuleOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RuleOptionError::UnknownFrequency(s.to_string()))
    }
}

/// Entry of the `byDayOfWeek` option.
///
/// Serialized as `"MO"` or `["FR", -1]`. Examples:
/// - `MO` - every Monday
/// - `["MO", 1]` - first Monday of the month/year
/// - `["FR", -1]` - last Friday of the month/year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayOfWeekEntry {
    Every(Weekday),
    Nth(Weekday, i32),
}

impl DayOfWeekEntry {
    #[must_use]
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Every(weekday) | Self::Nth(weekday, _) => weekday,
        }
    }

    /// Occurrence number within the month or year, if any.
    #[must_use]
    pub const fn nth(self) -> Option<i32> {
        match self {
            Self::Every(_) => None,
            Self::Nth(_, nth) => Some(nth),
        }
    }
}

impl From<Weekday> for DayOfWeekEntry {
    fn from(weekday: Weekday) -> Self {
        Self::Every(weekday)
    }
}

impl fmt::Display for DayOfWeekEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.nth() {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday())
    }
}

/// Options as supplied by the caller.
///
/// Only `start` and `frequency` are required; everything else is defaulted or
/// left unconstrained by [`normalize_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOptions {
    pub start: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Length of every occurrence, serialized as milliseconds.
    #[serde(default, with = "duration_millis", skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeDelta>,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_month_of_year: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_day_of_year: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_day_of_month: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_day_of_week: Option<Vec<DayOfWeekEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_hour_of_day: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_minute_of_hour: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_second_of_minute: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_millisecond_of_second: Option<Vec<u32>>,
}

impl RuleOptions {
    /// Creates options with only the required fields set.
    #[must_use]
    pub fn new(frequency: Frequency, start: DateTime) -> Self {
        Self {
            start,
            end: None,
            count: None,
            duration: None,
            frequency,
            interval: None,
            week_start: None,
            by_month_of_year: None,
            by_day_of_year: None,
            by_day_of_month: None,
            by_day_of_week: None,
            by_hour_of_day: None,
            by_minute_of_hour: None,
            by_second_of_minute: None,
            by_millisecond_of_second: None,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: DateTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: TimeDelta) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = Some(week_start);
        self
    }

    #[must_use]
    pub fn with_by_month_of_year(mut self, months: Vec<u32>) -> Self {
        self.by_month_of_year = Some(months);
        self
    }

    #[must_use]
    pub fn with_by_day_of_year(mut self, days: Vec<i32>) -> Self {
        self.by_day_of_year = Some(days);
        self
    }

    #[must_use]
    pub fn with_by_day_of_month(mut self, days: Vec<i32>) -> Self {
        self.by_day_of_month = Some(days);
        self
    }

    #[must_use]
    pub fn with_by_day_of_week(mut self, days: Vec<DayOfWeekEntry>) -> Self {
        self.by_day_of_week = Some(days);
        self
    }

    #[must_use]
    pub fn with_by_hour_of_day(mut self, hours: Vec<u32>) -> Self {
        self.by_hour_of_day = Some(hours);
        self
    }

    #[must_use]
    pub fn with_by_minute_of_hour(mut self, minutes: Vec<u32>) -> Self {
        self.by_minute_of_hour = Some(minutes);
        self
    }

    #[must_use]
    pub fn with_by_second_of_minute(mut self, seconds: Vec<u32>) -> Self {
        self.by_second_of_minute = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_by_millisecond_of_second(mut self, milliseconds: Vec<u32>) -> Self {
        self.by_millisecond_of_second = Some(milliseconds);
        self
    }
}

/// Canonical, validated and defaulted options for one rule.
///
/// Every present `by*` list is non-empty and range checked; numeric lists are
/// sorted ascending. Values are only ever produced by [`normalize_options`]
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    start: DateTime,
    end: Option<DateTime>,
    count: Option<u32>,
    duration: Option<TimeDelta>,
    frequency: Frequency,
    interval: u32,
    week_start: Weekday,
    by_month_of_year: Option<Vec<u32>>,
    by_day_of_year: Option<Vec<i32>>,
    by_day_of_month: Option<Vec<i32>>,
    by_day_of_week: Option<Vec<DayOfWeekEntry>>,
    by_hour_of_day: Option<Vec<u32>>,
    by_minute_of_hour: Option<Vec<u32>>,
    by_second_of_minute: Option<Vec<u32>>,
    by_millisecond_of_second: Option<Vec<u32>>,
}

impl NormalizedOptions {
    #[must_use]
    pub const fn start(&self) -> DateTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<DateTime> {
        self.end
    }

    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    #[must_use]
    pub const fn duration(&self) -> Option<TimeDelta> {
        self.duration
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn week_start(&self) -> Weekday {
        self.week_start
    }

    #[must_use]
    pub fn by_month_of_year(&self) -> Option<&[u32]> {
        self.by_month_of_year.as_deref()
    }

    #[must_use]
    pub fn by_day_of_year(&self) -> Option<&[i32]> {
        self.by_day_of_year.as_deref()
    }

    #[must_use]
    pub fn by_day_of_month(&self) -> Option<&[i32]> {
        self.by_day_of_month.as_deref()
    }

    #[must_use]
    pub fn by_day_of_week(&self) -> Option<&[DayOfWeekEntry]> {
        self.by_day_of_week.as_deref()
    }

    #[must_use]
    pub fn by_hour_of_day(&self) -> Option<&[u32]> {
        self.by_hour_of_day.as_deref()
    }

    #[must_use]
    pub fn by_minute_of_hour(&self) -> Option<&[u32]> {
        self.by_minute_of_hour.as_deref()
    }

    #[must_use]
    pub fn by_second_of_minute(&self) -> Option<&[u32]> {
        self.by_second_of_minute.as_deref()
    }

    #[must_use]
    pub fn by_millisecond_of_second(&self) -> Option<&[u32]> {
        self.by_millisecond_of_second.as_deref()
    }
}

pub(crate) mod duration_millis {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[expect(clippy::ref_option, reason = "Signature required by serde `with`")]
    pub fn serialize<S: Serializer>(value: &Option<TimeDelta>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.num_milliseconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        Option::<i64>::deserialize(deserializer)?
            .map(|millis| {
                TimeDelta::try_milliseconds(millis)
                    .ok_or_else(|| D::Error::custom("duration out of range"))
            })
            .transpose()
    }
}
