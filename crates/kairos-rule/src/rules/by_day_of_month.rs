use super::by_day_of_week::nth_weekday_of_period;
use super::{Direction, RecurrenceRuleResult};
use crate::date::{DateField, DateTime, TimeUnit, Weekday};
use crate::error::{RecurrenceRuleError, RuleOptionError};
use crate::options::{
    DayOfWeekEntry, Frequency, NormalizedOptions, OptionsAccumulator, RuleOptions, check_entries,
    sorted,
};

const OPTION: &str = "byDayOfMonth";

/// Months searched for a matching day before giving up.
const MAX_MONTHS: usize = 30;

pub(crate) fn normalize_options(
    raw: &RuleOptions,
    accumulator: &mut OptionsAccumulator,
) -> Result<(), RuleOptionError> {
    let base = accumulator.base()?;
    accumulator.by_day_of_month = match raw.by_day_of_month.as_deref() {
        Some(_) if base.frequency == Frequency::Weekly => {
            return Err(RuleOptionError::IncompatibleFrequency {
                option: OPTION,
                frequency: base.frequency,
            });
        }
        Some(days) => {
            check_entries(OPTION, days, |day| day != 0 && day.abs() <= 31)?;
            Some(sorted(days))
        }
        None if matches!(base.frequency, Frequency::Yearly | Frequency::Monthly)
            && raw.by_day_of_week.is_none()
            && raw.by_day_of_year.is_none() =>
        {
            Some(vec![base.start.get(DateField::Day)])
        }
        None => None,
    };
    Ok(())
}

/// Keeps dates whose day of month is listed. Negative entries count from the
/// end of the month; when `byDayOfWeek` is also set, only days satisfying it
/// are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByDayOfMonthRule {
    days: Vec<i32>,
    weekdays: Option<Vec<DayOfWeekEntry>>,
    /// Period `["FR", -1]`-style weekday entries count within.
    nth_period: TimeUnit,
    week_start: Weekday,
    direction: Direction,
}

impl ByDayOfMonthRule {
    #[must_use]
    pub fn get(options: &NormalizedOptions, direction: Direction) -> Option<Self> {
        let nth_period =
            if options.frequency() == Frequency::Yearly && options.by_month_of_year().is_none() {
                TimeUnit::Year
            } else {
                TimeUnit::Month
            };
        Some(Self {
            days: options.by_day_of_month()?.to_vec(),
            weekdays: options.by_day_of_week().map(<[DayOfWeekEntry]>::to_vec),
            nth_period,
            week_start: options.week_start(),
            direction,
        })
    }

    /// ## Errors
    ///
    /// Returns `InfiniteLoop` if no matching day exists in the next 30 months.
    pub fn run(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        match self.direction {
            Direction::Forward => self.forward(date),
            Direction::Reverse => self.reverse(date),
        }
    }

    /// Matching days of the month starting at `month_start`, sorted.
    fn days_in(&self, month_start: DateTime) -> Vec<i32> {
        let length = i32::try_from(month_start.days_in_month()).unwrap_or(28);
        let mut days: Vec<i32> = self
            .days
            .iter()
            .filter(|day| day.abs() <= length)
            .map(|day| if *day > 0 { *day } else { length + day + 1 })
            .collect();

        if let Some(weekdays) = &self.weekdays {
            days.retain(|day| {
                let date = month_start.set(DateField::Day, *day);
                weekdays.iter().any(|entry| self.matches(*entry, date))
            });
        }
        days.sort_unstable();
        days.dedup();
        days
    }

    fn matches(&self, entry: DayOfWeekEntry, date: DateTime) -> bool {
        match entry {
            DayOfWeekEntry::Every(weekday) => date.weekday() == weekday,
            DayOfWeekEntry::Nth(weekday, nth) => {
                let period_start = date.granularity(self.nth_period, self.week_start);
                let period_end = period_start.add(1, self.nth_period);
                nth_weekday_of_period(period_start, period_end, weekday, nth) == Some(date)
            }
        }
    }

    fn forward(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let month = date.granularity(TimeUnit::Month, self.week_start);
        let current = date.get(DateField::Day);

        if let Some(day) = self.days_in(month).into_iter().find(|day| *day >= current) {
            return Ok(if day == current {
                RecurrenceRuleResult::Valid(date)
            } else {
                RecurrenceRuleResult::Invalid(month.set(DateField::Day, day))
            });
        }

        let mut next = month;
        for _ in 0..MAX_MONTHS {
            next = next.add(1, TimeUnit::Month);
            if let Some(&day) = self.days_in(next).first() {
                return Ok(RecurrenceRuleResult::Invalid(next.set(DateField::Day, day)));
            }
        }
        Err(RecurrenceRuleError::InfiniteLoop { rule: OPTION })
    }

    fn reverse(&self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let month = date.granularity(TimeUnit::Month, self.week_start);
        let current = date.get(DateField::Day);

        if let Some(day) = self.days_in(month).into_iter().rev().find(|day| *day <= current) {
            return Ok(if day == current {
                RecurrenceRuleResult::Valid(date)
            } else {
                RecurrenceRuleResult::Invalid(self.end_of(month, day))
            });
        }

        let mut previous = month;
        for _ in 0..MAX_MONTHS {
            previous = previous.subtract(1, TimeUnit::Month);
            if let Some(&day) = self.days_in(previous).last() {
                return Ok(RecurrenceRuleResult::Invalid(self.end_of(previous, day)));
            }
        }
        Err(RecurrenceRuleError::InfiniteLoop { rule: OPTION })
    }

    fn end_of(&self, month: DateTime, day: i32) -> DateTime {
        month
            .set(DateField::Day, day)
            .end_granularity(TimeUnit::Day, self.week_start)
    }
}
