//! Weekday constraints, either as a plain filter or expanded across the
//! month or year for `["FR", -1]`-style entries.

use super::{Direction, RecurrenceRuleResult};
use crate::date::{DateTime, TimeUnit, Weekday};
use crate::error::{RecurrenceRuleError, RuleOptionError};
use crate::options::{DayOfWeekEntry, Frequency, NormalizedOptions, OptionsAccumulator, RuleOptions};

const OPTION: &str = "byDayOfWeek";

/// Periods searched before a combination is declared impossible. Weekday
/// layouts repeat every 28 years.
const MAX_YEARS: usize = 28;
const MAX_MONTHS: usize = 50;

pub(crate) fn normalize_options(
    raw: &RuleOptions,
    accumulator: &mut OptionsAccumulator,
) -> Result<(), RuleOptionError> {
    let base = accumulator.base()?;
    accumulator.by_day_of_week = match raw.by_day_of_week.as_deref() {
        Some(entries) => Some(validate(entries, base.frequency)?),
        None if base.frequency == Frequency::Weekly && raw.by_day_of_month.is_none() => {
            Some(vec![DayOfWeekEntry::Every(base.start.weekday())])
        }
        None => None,
    };
    Ok(())
}

fn validate(
    entries: &[DayOfWeekEntry],
    frequency: Frequency,
) -> Result<Vec<DayOfWeekEntry>, RuleOptionError> {
    if entries.is_empty() {
        return Err(RuleOptionError::EmptyOption { option: OPTION });
    }
    let limit: Option<u32> = match frequency {
        Frequency::Monthly => Some(31),
        Frequency::Yearly => Some(366),
        _ => None,
    };

    let mut unique = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(nth) = entry.nth() {
            let Some(limit) = limit else {
                return Err(RuleOptionError::NthNotAllowed {
                    entry: entry.to_string(),
                });
            };
            if nth == 0 || nth.unsigned_abs() > limit {
                return Err(RuleOptionError::OutOfRange {
                    option: OPTION,
                    value: i64::from(nth),
                });
            }
        }
        if !unique.contains(entry) {
            unique.push(*entry);
        }
    }
    Ok(unique)
}

/// The `nth` `weekday` inside `[period_start, period_end)`, counting from
/// the end when `nth` is negative. `period_start` must be a day boundary.
pub(crate) fn nth_weekday_of_period(
    period_start: DateTime,
    period_end: DateTime,
    weekday: Weekday,
    nth: i32,
) -> Option<DateTime> {
    let weeks = i64::from(nth.unsigned_abs()) - 1;
    if nth > 0 {
        let first = period_start.add(i64::from(weekday.days_since(period_start.weekday())), TimeUnit::Day);
        let date = first.add(weeks, TimeUnit::Week);
        (date < period_end).then_some(date)
    } else {
        let last_day = period_end.subtract(1, TimeUnit::Day);
        let last = last_day.subtract(i64::from(last_day.weekday().days_since(weekday)), TimeUnit::Day);
        let date = last.subtract(weeks, TimeUnit::Week);
        (date >= period_start).then_some(date)
    }
}

/// Every `weekday` inside `[period_start, period_end)`.
pub(crate) fn weekdays_of_period(
    period_start: DateTime,
    period_end: DateTime,
    weekday: Weekday,
) -> impl Iterator<Item = DateTime> {
    let first = period_start.add(i64::from(weekday.days_since(period_start.weekday())), TimeUnit::Day);
    (0..)
        .map(move |week| first.add(week, TimeUnit::Week))
        .take_while(move |date| *date < period_end)
}

/// Keeps dates falling on one of the listed weekdays.
///
/// With YEARLY or MONTHLY frequency the entries are expanded to concrete
/// dates of the year (no `byMonthOfYear`) or month, which is what gives
/// `["TU", 1]` its "first Tuesday" meaning. Any other frequency filters by
/// weekday only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByDayOfWeekRule {
    entries: Vec<DayOfWeekEntry>,
    expansion: Option<TimeUnit>,
    week_start: Weekday,
    direction: Direction,
}

impl ByDayOfWeekRule {
    #[must_use]
    pub fn get(options: &NormalizedOptions, direction: Direction) -> Option<Self> {
        let entries = options.by_day_of_week()?.to_vec();
        let expansion = match options.frequency() {
            Frequency::Yearly if options.by_month_of_year().is_none() => Some(TimeUnit::Year),
            Frequency::Yearly | Frequency::Monthly => Some(TimeUnit::Month),
            _ => None,
        };
        Some(Self {
            entries,
            expansion,
            week_start: options.week_start(),
            direction,
        })
    }

    /// ## Errors
    ///
    /// Returns `ImpossibleCombination` if no matching date exists within 28
    /// years (year expansion) or 50 months (month expansion).
    pub fn run(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        match (self.expansion, self.direction) {
            (None, Direction::Forward) => self.filter_forward(date),
            (None, Direction::Reverse) => self.filter_reverse(date),
            (Some(unit), Direction::Forward) => self.expand_forward(date, unit),
            (Some(unit), Direction::Reverse) => self.expand_reverse(date, unit),
        }
    }

    fn filter_forward(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let current = date.weekday();
        let ahead = self
            .entries
            .iter()
            .map(|entry| entry.weekday().days_since(current))
            .min()
            .ok_or(RecurrenceRuleError::NoRepresentableValue { rule: OPTION })?;

        Ok(if ahead == 0 {
            RecurrenceRuleResult::Valid(date)
        } else {
            RecurrenceRuleResult::Invalid(
                date.granularity(TimeUnit::Day, self.week_start)
                    .add(i64::from(ahead), TimeUnit::Day),
            )
        })
    }

    fn filter_reverse(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let current = date.weekday();
        let behind = self
            .entries
            .iter()
            .map(|entry| current.days_since(entry.weekday()))
            .min()
            .ok_or(RecurrenceRuleError::NoRepresentableValue { rule: OPTION })?;

        Ok(if behind == 0 {
            RecurrenceRuleResult::Valid(date)
        } else {
            RecurrenceRuleResult::Invalid(
                date.subtract(i64::from(behind), TimeUnit::Day)
                    .end_granularity(TimeUnit::Day, self.week_start),
            )
        })
    }

    /// Matching days of the period starting at `period_start`, sorted.
    fn dates_in(&self, period_start: DateTime, unit: TimeUnit) -> Vec<DateTime> {
        let period_end = period_start.add(1, unit);
        let mut dates = Vec::new();
        for entry in &self.entries {
            match *entry {
                DayOfWeekEntry::Every(weekday) => {
                    dates.extend(weekdays_of_period(period_start, period_end, weekday));
                }
                DayOfWeekEntry::Nth(weekday, nth) => {
                    dates.extend(nth_weekday_of_period(period_start, period_end, weekday, nth));
                }
            }
        }
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    const fn max_periods(unit: TimeUnit) -> usize {
        match unit {
            TimeUnit::Year => MAX_YEARS,
            _ => MAX_MONTHS,
        }
    }

    fn expand_forward(
        &self,
        date: DateTime,
        unit: TimeUnit,
    ) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let day = date.granularity(TimeUnit::Day, self.week_start);
        let mut period = date.granularity(unit, self.week_start);

        for _ in 0..=Self::max_periods(unit) {
            if let Some(found) = self.dates_in(period, unit).into_iter().find(|found| *found >= day) {
                return Ok(if found == day {
                    RecurrenceRuleResult::Valid(date)
                } else {
                    RecurrenceRuleResult::Invalid(found)
                });
            }
            period = period.add(1, unit);
        }
        Err(RecurrenceRuleError::ImpossibleCombination { rule: OPTION })
    }

    fn expand_reverse(
        &self,
        date: DateTime,
        unit: TimeUnit,
    ) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let day = date.granularity(TimeUnit::Day, self.week_start);
        let mut period = date.granularity(unit, self.week_start);

        for _ in 0..=Self::max_periods(unit) {
            if let Some(found) = self
                .dates_in(period, unit)
                .into_iter()
                .rev()
                .find(|found| *found <= day)
            {
                return Ok(if found == day {
                    RecurrenceRuleResult::Valid(date)
                } else {
                    RecurrenceRuleResult::Invalid(found.end_granularity(TimeUnit::Day, self.week_start))
                });
            }
            period = period.subtract(1, unit);
        }
        Err(RecurrenceRuleError::ImpossibleCombination { rule: OPTION })
    }
}
