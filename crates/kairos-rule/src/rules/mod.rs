//! Rule modules: one per constraint kind, each bundling option
//! normalization, a forward and a reverse algorithm, and its declared
//! dependencies.

pub mod by_day_of_month;
pub mod by_day_of_week;
pub mod by_day_of_year;
pub mod by_month_of_year;
pub mod frequency;
pub mod time_of_unit;

use kairos_core::error::CoreError;

use crate::date::DateTime;
use crate::error::{RecurrenceRuleError, RuleOptionError, RuleResult};
use crate::options::{NormalizedOptions, OptionsAccumulator, RuleOptions};

pub use by_day_of_month::ByDayOfMonthRule;
pub use by_day_of_week::ByDayOfWeekRule;
pub use by_day_of_year::ByDayOfYearRule;
pub use frequency::FrequencyRule;
pub use time_of_unit::{TimeField, TimeOfUnitRule};

/// Iteration direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Reverse)
    }
}

/// Outcome of running one rule against a candidate date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceRuleResult {
    /// The candidate satisfies the rule.
    Valid(DateTime),
    /// The candidate fails; the payload is the next date worth trying.
    Invalid(DateTime),
}

impl RecurrenceRuleResult {
    #[must_use]
    pub const fn date(self) -> DateTime {
        match self {
            Self::Valid(date) | Self::Invalid(date) => date,
        }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Closed set of constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleModule {
    Frequency,
    ByMonthOfYear,
    ByDayOfYear,
    ByDayOfMonth,
    ByDayOfWeek,
    ByHourOfDay,
    ByMinuteOfHour,
    BySecondOfMinute,
    ByMillisecondOfSecond,
}

impl RuleModule {
    /// Every module, already in dependency order.
    pub const ALL: [Self; 9] = [
        Self::Frequency,
        Self::ByMonthOfYear,
        Self::ByDayOfYear,
        Self::ByDayOfMonth,
        Self::ByDayOfWeek,
        Self::ByHourOfDay,
        Self::ByMinuteOfHour,
        Self::BySecondOfMinute,
        Self::ByMillisecondOfSecond,
    ];

    /// Name of the option this module governs.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::ByMonthOfYear => "byMonthOfYear",
            Self::ByDayOfYear => "byDayOfYear",
            Self::ByDayOfMonth => "byDayOfMonth",
            Self::ByDayOfWeek => "byDayOfWeek",
            Self::ByHourOfDay => time_of_unit::HOUR_OF_DAY.option,
            Self::ByMinuteOfHour => time_of_unit::MINUTE_OF_HOUR.option,
            Self::BySecondOfMinute => time_of_unit::SECOND_OF_MINUTE.option,
            Self::ByMillisecondOfSecond => time_of_unit::MILLISECOND_OF_SECOND.option,
        }
    }

    /// Modules that must be normalized and evaluated before this one.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Self] {
        match self {
            Self::Frequency => &[],
            Self::ByMonthOfYear => &[Self::Frequency],
            Self::ByDayOfYear => &[Self::Frequency, Self::ByMonthOfYear],
            Self::ByDayOfMonth => &[Self::Frequency, Self::ByMonthOfYear, Self::ByDayOfYear],
            Self::ByDayOfWeek => &[
                Self::Frequency,
                Self::ByMonthOfYear,
                Self::ByDayOfYear,
                Self::ByDayOfMonth,
            ],
            Self::ByHourOfDay => &[
                Self::Frequency,
                Self::ByMonthOfYear,
                Self::ByDayOfYear,
                Self::ByDayOfMonth,
                Self::ByDayOfWeek,
            ],
            Self::ByMinuteOfHour => &[Self::Frequency, Self::ByHourOfDay],
            Self::BySecondOfMinute => &[Self::Frequency, Self::ByMinuteOfHour],
            Self::ByMillisecondOfSecond => &[Self::Frequency, Self::BySecondOfMinute],
        }
    }

    /// ## Summary
    /// Sorts `modules` so every module follows the dependencies it declares.
    ///
    /// Ties keep the caller's order; duplicates are dropped. Dependencies
    /// missing from `modules` are ignored.
    ///
    /// ## Errors
    ///
    /// Returns `MissingFrequencyModule` if the frequency module is absent.
    pub fn resolve_order(modules: &[Self]) -> RuleResult<Vec<Self>> {
        let mut pending: Vec<Self> = Vec::with_capacity(modules.len());
        for module in modules {
            if !pending.contains(module) {
                pending.push(*module);
            }
        }
        if !pending.contains(&Self::Frequency) {
            return Err(RuleOptionError::MissingFrequencyModule.into());
        }

        let mut ordered = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let ready = pending.iter().position(|module| {
                module
                    .dependencies()
                    .iter()
                    .all(|dependency| !pending.contains(dependency))
            });
            let Some(index) = ready else {
                return Err(CoreError::InvariantViolation("Rule module dependencies form a cycle").into());
            };
            ordered.push(pending.remove(index));
        }
        Ok(ordered)
    }

    /// Whether the raw options carry this module's option.
    #[must_use]
    pub const fn is_present_in(self, raw: &RuleOptions) -> bool {
        match self {
            Self::Frequency => true,
            Self::ByMonthOfYear => raw.by_month_of_year.is_some(),
            Self::ByDayOfYear => raw.by_day_of_year.is_some(),
            Self::ByDayOfMonth => raw.by_day_of_month.is_some(),
            Self::ByDayOfWeek => raw.by_day_of_week.is_some(),
            Self::ByHourOfDay => raw.by_hour_of_day.is_some(),
            Self::ByMinuteOfHour => raw.by_minute_of_hour.is_some(),
            Self::BySecondOfMinute => raw.by_second_of_minute.is_some(),
            Self::ByMillisecondOfSecond => raw.by_millisecond_of_second.is_some(),
        }
    }

    pub(crate) fn normalize_options(
        self,
        raw: &RuleOptions,
        accumulator: &mut OptionsAccumulator,
    ) -> Result<(), RuleOptionError> {
        match self {
            Self::Frequency => frequency::normalize_options(raw, accumulator),
            Self::ByMonthOfYear => by_month_of_year::normalize_options(raw, accumulator),
            Self::ByDayOfYear => by_day_of_year::normalize_options(raw, accumulator),
            Self::ByDayOfMonth => by_day_of_month::normalize_options(raw, accumulator),
            Self::ByDayOfWeek => by_day_of_week::normalize_options(raw, accumulator),
            Self::ByHourOfDay => {
                accumulator.by_hour_of_day = time_of_unit::HOUR_OF_DAY
                    .normalize(raw.by_hour_of_day.as_deref(), accumulator.base()?)?;
                Ok(())
            }
            Self::ByMinuteOfHour => {
                accumulator.by_minute_of_hour = time_of_unit::MINUTE_OF_HOUR
                    .normalize(raw.by_minute_of_hour.as_deref(), accumulator.base()?)?;
                Ok(())
            }
            Self::BySecondOfMinute => {
                accumulator.by_second_of_minute = time_of_unit::SECOND_OF_MINUTE
                    .normalize(raw.by_second_of_minute.as_deref(), accumulator.base()?)?;
                Ok(())
            }
            Self::ByMillisecondOfSecond => {
                accumulator.by_millisecond_of_second = time_of_unit::MILLISECOND_OF_SECOND
                    .normalize(raw.by_millisecond_of_second.as_deref(), accumulator.base()?)?;
                Ok(())
            }
        }
    }

    /// Builds the rule for `direction`, or `None` when the governing option
    /// is absent (the constraint is then unbounded).
    pub(crate) fn instantiate(
        self,
        options: &NormalizedOptions,
        direction: Direction,
    ) -> Option<RuleInstance> {
        match self {
            Self::Frequency => Some(RuleInstance::Frequency),
            Self::ByMonthOfYear => TimeOfUnitRule::get(
                time_of_unit::MONTH_OF_YEAR,
                options.by_month_of_year(),
                options,
                direction,
            )
            .map(RuleInstance::TimeOfUnit),
            Self::ByDayOfYear => {
                ByDayOfYearRule::get(options, direction).map(RuleInstance::ByDayOfYear)
            }
            Self::ByDayOfMonth => {
                ByDayOfMonthRule::get(options, direction).map(RuleInstance::ByDayOfMonth)
            }
            Self::ByDayOfWeek => {
                ByDayOfWeekRule::get(options, direction).map(RuleInstance::ByDayOfWeek)
            }
            Self::ByHourOfDay => TimeOfUnitRule::get(
                time_of_unit::HOUR_OF_DAY,
                options.by_hour_of_day(),
                options,
                direction,
            )
            .map(RuleInstance::TimeOfUnit),
            Self::ByMinuteOfHour => TimeOfUnitRule::get(
                time_of_unit::MINUTE_OF_HOUR,
                options.by_minute_of_hour(),
                options,
                direction,
            )
            .map(RuleInstance::TimeOfUnit),
            Self::BySecondOfMinute => TimeOfUnitRule::get(
                time_of_unit::SECOND_OF_MINUTE,
                options.by_second_of_minute(),
                options,
                direction,
            )
            .map(RuleInstance::TimeOfUnit),
            Self::ByMillisecondOfSecond => TimeOfUnitRule::get(
                time_of_unit::MILLISECOND_OF_SECOND,
                options.by_millisecond_of_second(),
                options,
                direction,
            )
            .map(RuleInstance::TimeOfUnit),
        }
    }
}

/// Active rule bound to one iterator.
#[derive(Debug, Clone)]
pub(crate) enum RuleInstance {
    /// Marker for the shared [`FrequencyRule`] owned by the chain.
    Frequency,
    TimeOfUnit(TimeOfUnitRule),
    ByDayOfYear(ByDayOfYearRule),
    ByDayOfMonth(ByDayOfMonthRule),
    ByDayOfWeek(ByDayOfWeekRule),
}

impl RuleInstance {
    /// Runs the rule, then re-validates the outcome against the current
    /// interval window.
    pub(crate) fn run(
        &self,
        date: DateTime,
        frequency: &mut FrequencyRule,
    ) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        let result = match self {
            Self::Frequency => RecurrenceRuleResult::Valid(date),
            Self::TimeOfUnit(rule) => rule.run(date)?,
            Self::ByDayOfYear(rule) => rule.run(date)?,
            Self::ByDayOfMonth(rule) => rule.run(date)?,
            Self::ByDayOfWeek(rule) => rule.run(date)?,
        };
        Ok(frequency.validate(result))
    }
}
