use super::{Direction, RecurrenceRuleResult};
use crate::date::{DateField, DateTime, TimeUnit, Weekday};
use crate::error::{RecurrenceRuleError, RuleOptionError};
use crate::options::{Frequency, NormalizedOptions, OptionsAccumulator, RuleOptions, check_entries, sorted};

const OPTION: &str = "byDayOfYear";

/// Years searched for a matching day before giving up.
const MAX_YEARS: usize = 5;

pub(crate) fn normalize_options(
    raw: &RuleOptions,
    accumulator: &mut OptionsAccumulator,
) -> Result<(), RuleOptionError> {
    let Some(days) = raw.by_day_of_year.as_deref() else {
        return Ok(());
    };
    let base = accumulator.base()?;
    if matches!(
        base.frequency,
        Frequency::Daily | Frequency::Weekly | Frequency::Monthly
    ) {
        return Err(RuleOptionError::IncompatibleFrequency {
            option: OPTION,
            frequency: base.frequency,
        });
    }
    check_entries(OPTION, days, |day| day != 0 && day.abs() <= 366)?;
    accumulator.by_day_of_year = Some(sorted(days));
    Ok(())
}

/// Keeps dates whose day of year is listed. Negative entries count from the
/// end of the year (`-1` is December 31st).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByDayOfYearRule {
    days: Vec<i32>,
    week_start: Weekday,
    direction: Direction,
}

impl ByDayOfYearRule {
    #[must_use]
    pub fn get(options: &NormalizedOptions, direction: Direction) -> Option<Self> {
        Some(Self {
            days: options.by_day_of_year()?.to_vec(),
            week_start: options.week_start(),
            direction,
        })
    }

    /// ## Errors
    ///
    /// Returns `InfiniteLoop` if no matching day exists in the next five years.
    pub fn run(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        match self.direction {
            Direction::Forward => self.forward(date),
            Direction::Reverse => self.reverse(date),
        }
    }

    /// Ordinal days matching in the year starting at `year_start`.
    fn days_in(&self, year_start: DateTime) -> Vec<i32> {
        let length = i32::try_from(year_start.days_in_year()).unwrap_or(365);
        let mut days: Vec<i32> = self
            .days
            .iter()
            .filter(|day| day.abs() <= length)
            .map(|day| if *day > 0 { *day } else { length + day + 1 })
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    fn forward(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let year = date.granularity(TimeUnit::Year, self.week_start);
        let current = date.get(DateField::Yearday);

        if let Some(day) = self.days_in(year).into_iter().find(|day| *day >= current) {
            return Ok(if day == current {
                RecurrenceRuleResult::Valid(date)
            } else {
                RecurrenceRuleResult::Invalid(year.set(DateField::Yearday, day))
            });
        }

        let mut next = year;
        for _ in 0..MAX_YEARS {
            next = next.add(1, TimeUnit::Year);
            if let Some(&day) = self.days_in(next).first() {
                return Ok(RecurrenceRuleResult::Invalid(next.set(DateField::Yearday, day)));
            }
        }
        Err(RecurrenceRuleError::InfiniteLoop { rule: OPTION })
    }

    fn reverse(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let year = date.granularity(TimeUnit::Year, self.week_start);
        let current = date.get(DateField::Yearday);

        if let Some(day) = self.days_in(year).into_iter().rev().find(|day| *day <= current) {
            return Ok(if day == current {
                RecurrenceRuleResult::Valid(date)
            } else {
                RecurrenceRuleResult::Invalid(self.end_of(year, day))
            });
        }

        let mut previous = year;
        for _ in 0..MAX_YEARS {
            previous = previous.subtract(1, TimeUnit::Year);
            if let Some(&day) = self.days_in(previous).last() {
                return Ok(RecurrenceRuleResult::Invalid(self.end_of(previous, day)));
            }
        }
        Err(RecurrenceRuleError::InfiniteLoop { rule: OPTION })
    }

    fn end_of(&self, year: DateTime, day: i32) -> DateTime {
        year.set(DateField::Yearday, day)
            .end_granularity(TimeUnit::Day, self.week_start)
    }
}
