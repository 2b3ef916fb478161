//! Rules constraining one numeric field within its enclosing period:
//! hour of day, minute of hour, second of minute, millisecond of second and
//! month of year.

use super::{Direction, RecurrenceRuleResult};
use crate::date::{DateField, DateTime, TimeUnit, Weekday};
use crate::error::{RecurrenceRuleError, RuleOptionError};
use crate::options::{BaseOptions, Frequency, NormalizedOptions, check_entries, sorted};

/// Describes one constrainable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeField {
    /// Option name, used in errors.
    pub option: &'static str,
    pub field: DateField,
    /// Period the field cycles within.
    pub period: TimeUnit,
    /// Smallest accepted option value.
    pub min: u32,
    /// Largest accepted option value.
    pub max: u32,
    /// Largest value a date can actually hold.
    pub last: u32,
    /// Frequencies at least this fine iterate the field themselves and
    /// leave it undefaulted.
    pub iterated_by: Frequency,
}

pub const MONTH_OF_YEAR: TimeField = TimeField {
    option: "byMonthOfYear",
    field: DateField::Month,
    period: TimeUnit::Year,
    min: 1,
    max: 12,
    last: 12,
    iterated_by: Frequency::Monthly,
};

pub const HOUR_OF_DAY: TimeField = TimeField {
    option: "byHourOfDay",
    field: DateField::Hour,
    period: TimeUnit::Day,
    min: 0,
    max: 23,
    last: 23,
    iterated_by: Frequency::Hourly,
};

pub const MINUTE_OF_HOUR: TimeField = TimeField {
    option: "byMinuteOfHour",
    field: DateField::Minute,
    period: TimeUnit::Hour,
    min: 0,
    max: 59,
    last: 59,
    iterated_by: Frequency::Minutely,
};

/// Second 60 is accepted for leap-second compatibility but no date holds it.
pub const SECOND_OF_MINUTE: TimeField = TimeField {
    option: "bySecondOfMinute",
    field: DateField::Second,
    period: TimeUnit::Minute,
    min: 0,
    max: 60,
    last: 59,
    iterated_by: Frequency::Secondly,
};

pub const MILLISECOND_OF_SECOND: TimeField = TimeField {
    option: "byMillisecondOfSecond",
    field: DateField::Millisecond,
    period: TimeUnit::Second,
    min: 0,
    max: 999,
    last: 999,
    iterated_by: Frequency::Millisecondly,
};

impl TimeField {
    /// Validates and sorts `values`; when absent, defaults to the start's
    /// value unless the frequency iterates this field or a finer one.
    pub(crate) fn normalize(
        self,
        values: Option<&[u32]>,
        base: BaseOptions,
    ) -> Result<Option<Vec<u32>>, RuleOptionError> {
        match values {
            Some(values) => {
                let range = i64::from(self.min)..=i64::from(self.max);
                check_entries(self.option, values, |value| range.contains(&value))?;
                Ok(Some(sorted(values)))
            }
            None if base.frequency < self.iterated_by => {
                let current = u32::try_from(base.start.get(self.field)).unwrap_or(self.min);
                Ok(Some(vec![current]))
            }
            None => Ok(None),
        }
    }
}

/// Keeps dates whose field is one of a sorted list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfUnitRule {
    field: TimeField,
    values: Vec<i32>,
    week_start: Weekday,
    direction: Direction,
}

impl TimeOfUnitRule {
    /// Returns `None` when `values` is absent. Values no date can hold are
    /// dropped here.
    #[must_use]
    pub fn get(
        field: TimeField,
        values: Option<&[u32]>,
        options: &NormalizedOptions,
        direction: Direction,
    ) -> Option<Self> {
        let values = values?
            .iter()
            .filter(|value| **value <= field.last)
            .filter_map(|value| i32::try_from(*value).ok())
            .collect();
        Some(Self {
            field,
            values,
            week_start: options.week_start(),
            direction,
        })
    }

    /// ## Errors
    ///
    /// Returns `NoRepresentableValue` if every configured value was dropped.
    pub fn run(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let (Some(&first), Some(&last)) = (self.values.first(), self.values.last()) else {
            return Err(RecurrenceRuleError::NoRepresentableValue {
                rule: self.field.option,
            });
        };
        let current = date.get(self.field.field);
        let period = date.granularity(self.field.period, self.week_start);

        let result = match self.direction {
            Direction::Forward => match self.values.iter().find(|value| **value >= current) {
                Some(&value) if value == current => RecurrenceRuleResult::Valid(date),
                Some(&value) => RecurrenceRuleResult::Invalid(period.set(self.field.field, value)),
                None => RecurrenceRuleResult::Invalid(
                    period.add(1, self.field.period).set(self.field.field, first),
                ),
            },
            Direction::Reverse => {
                let unit = self.field.field.unit();
                match self.values.iter().rev().find(|value| **value <= current) {
                    Some(&value) if value == current => RecurrenceRuleResult::Valid(date),
                    Some(&value) => RecurrenceRuleResult::Invalid(
                        period
                            .set(self.field.field, value)
                            .end_granularity(unit, self.week_start),
                    ),
                    None => RecurrenceRuleResult::Invalid(
                        period
                            .subtract(1, self.field.period)
                            .set(self.field.field, last)
                            .end_granularity(unit, self.week_start),
                    ),
                }
            }
        };
        Ok(result)
    }
}
