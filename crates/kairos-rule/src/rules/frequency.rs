//! The frequency rule: interval windows anchored at the rule start.

use tracing::trace;

use super::{Direction, RecurrenceRuleResult};
use crate::date::{DateField, DateTime, TimeUnit, Weekday};
use crate::error::RuleOptionError;
use crate::options::{BaseOptions, NormalizedOptions, OptionsAccumulator, RuleOptions};

pub(crate) fn normalize_options(
    raw: &RuleOptions,
    accumulator: &mut OptionsAccumulator,
) -> Result<(), RuleOptionError> {
    let interval = raw.interval.unwrap_or(1);
    if interval < 1 {
        return Err(RuleOptionError::InvalidInterval(interval));
    }

    accumulator.base = Some(BaseOptions {
        start: raw.start,
        end: raw.end,
        count: raw.count,
        duration: raw.duration,
        frequency: raw.frequency,
        interval,
        week_start: raw.week_start.unwrap_or(Weekday::Monday),
    });
    Ok(())
}

/// Tracks the half-open window `[interval_start, interval_end)` of one
/// frequency unit, placed at a multiple of `interval` units from the
/// truncated rule start.
///
/// One instance is shared by every rule of an iterator; each rule's result
/// is passed through [`FrequencyRule::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRule {
    unit: TimeUnit,
    interval: i64,
    week_start: Weekday,
    direction: Direction,
    first_interval_start: DateTime,
    interval_start: DateTime,
    interval_end: DateTime,
}

impl FrequencyRule {
    #[must_use]
    pub fn new(options: &NormalizedOptions, direction: Direction) -> Self {
        let unit = options.frequency().unit();
        let week_start = options.week_start();
        let first_interval_start = options.start().granularity(unit, week_start);
        Self {
            unit,
            interval: i64::from(options.interval()),
            week_start,
            direction,
            first_interval_start,
            interval_start: first_interval_start,
            interval_end: first_interval_start.add(1, unit),
        }
    }

    #[must_use]
    pub const fn interval_start(&self) -> DateTime {
        self.interval_start
    }

    /// Exclusive end of the current window.
    #[must_use]
    pub const fn interval_end(&self) -> DateTime {
        self.interval_end
    }

    /// Whole frequency units between the first window and the window
    /// holding `date`, rounded to a multiple of `interval` (up when
    /// iterating forward, down in reverse).
    #[must_use]
    pub fn interval_difference(&self, date: DateTime) -> i64 {
        let truncated = date.granularity(self.unit, self.week_start);
        let units = match self.unit.fixed_millis() {
            Some(millis) => (truncated.value_of() - self.first_interval_start.value_of()) / millis,
            None => {
                let months = |date: DateTime| {
                    i64::from(date.get(DateField::Year)) * 12 + i64::from(date.get(DateField::Month))
                };
                let difference = months(truncated) - months(self.first_interval_start);
                if self.unit == TimeUnit::Year {
                    difference / 12
                } else {
                    difference
                }
            }
        };

        match self.direction {
            Direction::Forward => -(-units).div_euclid(self.interval) * self.interval,
            Direction::Reverse => units.div_euclid(self.interval) * self.interval,
        }
    }

    /// ## Summary
    /// Confirms `result` lies inside the current window, relocating the
    /// window when it does not.
    ///
    /// A valid date inside the window passes through unchanged. Otherwise
    /// the window moves to the nearest allowed one in the iteration
    /// direction; a date that falls inside it is returned as invalid
    /// unchanged, any other date is replaced by the window boundary.
    pub fn validate(&mut self, result: RecurrenceRuleResult) -> RecurrenceRuleResult {
        let date = result.date();
        if result.is_valid() && self.contains(date) {
            return result;
        }

        self.set_window(self.interval_difference(date));
        if self.contains(date) {
            return RecurrenceRuleResult::Invalid(date);
        }

        let boundary = match self.direction {
            Direction::Forward => self.interval_start,
            Direction::Reverse => self.interval_end.subtract(1, TimeUnit::Millisecond),
        };
        trace!(%date, %boundary, "Candidate outside interval window");
        RecurrenceRuleResult::Invalid(boundary)
    }

    fn contains(&self, date: DateTime) -> bool {
        self.interval_start <= date && date < self.interval_end
    }

    fn set_window(&mut self, units: i64) {
        self.interval_start = self.first_interval_start.add(units, self.unit);
        self.interval_end = self.interval_start.add(1, self.unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Frequency, RuleOptions, normalize_options};
    use crate::rules::RuleModule;

    fn rule(frequency: Frequency, interval: u32, start: &str, direction: Direction) -> FrequencyRule {
        let raw = RuleOptions::new(frequency, start.parse().expect("valid date"))
            .with_interval(interval);
        let options = normalize_options(&[RuleModule::Frequency], &raw).expect("valid options");
        FrequencyRule::new(&options, direction)
    }

    fn date(s: &str) -> DateTime {
        s.parse().expect("valid date")
    }

    #[test]
    fn first_window_is_truncated_start() {
        let rule = rule(Frequency::Monthly, 1, "2020-03-15T10:30:00", Direction::Forward);
        assert_eq!(rule.interval_start(), date("2020-03-01"));
        assert_eq!(rule.interval_end(), date("2020-04-01"));
    }

    #[test]
    fn weekly_window_anchors_on_week_start() {
        // 1997-09-02 is a Tuesday.
        let rule = rule(Frequency::Weekly, 1, "1997-09-02T09:00:00", Direction::Forward);
        assert_eq!(rule.interval_start(), date("1997-09-01"));
    }

    #[test]
    fn interval_difference_rounds_by_direction() {
        let forward = rule(Frequency::Monthly, 3, "2020-01-10", Direction::Forward);
        let reverse = rule(Frequency::Monthly, 3, "2020-01-10", Direction::Reverse);

        assert_eq!(forward.interval_difference(date("2020-01-20")), 0);
        assert_eq!(forward.interval_difference(date("2020-02-20")), 3);
        assert_eq!(reverse.interval_difference(date("2020-02-20")), 0);
        assert_eq!(reverse.interval_difference(date("2020-05-01")), 3);
        assert_eq!(forward.interval_difference(date("2021-01-01")), 12);
    }

    #[test]
    fn interval_difference_for_years() {
        let forward = rule(Frequency::Yearly, 2, "2020-06-01", Direction::Forward);
        assert_eq!(forward.interval_difference(date("2021-01-01")), 2);
        assert_eq!(forward.interval_difference(date("2022-12-31")), 2);
    }

    #[test]
    fn valid_inside_window_passes_through() {
        let mut rule = rule(Frequency::Daily, 2, "2020-01-01", Direction::Forward);
        let result = RecurrenceRuleResult::Valid(date("2020-01-01T12:00:00"));
        assert_eq!(rule.validate(result), result);
    }

    #[test]
    fn forward_jumps_to_next_window_start() {
        let mut rule = rule(Frequency::Daily, 2, "2020-01-01", Direction::Forward);

        let result = rule.validate(RecurrenceRuleResult::Valid(date("2020-01-02T08:00:00")));
        assert_eq!(result, RecurrenceRuleResult::Invalid(date("2020-01-03")));
        assert_eq!(rule.interval_start(), date("2020-01-03"));
    }

    #[test]
    fn reverse_jumps_to_previous_window_end() {
        let mut rule = rule(Frequency::Daily, 2, "2020-01-01", Direction::Reverse);

        let result = rule.validate(RecurrenceRuleResult::Valid(date("2020-01-04T08:00:00")));
        assert_eq!(
            result,
            RecurrenceRuleResult::Invalid(date("2020-01-03T23:59:59.999"))
        );
    }

    #[test]
    fn date_in_relocated_window_stays_invalid_unchanged() {
        let mut rule = rule(Frequency::Daily, 1, "2020-01-01", Direction::Forward);

        let result = rule.validate(RecurrenceRuleResult::Valid(date("2020-01-05T08:00:00")));
        assert_eq!(result, RecurrenceRuleResult::Invalid(date("2020-01-05T08:00:00")));

        let result = rule.validate(RecurrenceRuleResult::Valid(date("2020-01-05T09:00:00")));
        assert!(result.is_valid());
    }
}
