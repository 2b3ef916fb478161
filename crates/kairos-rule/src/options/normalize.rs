use chrono::TimeDelta;
use tracing::debug;

use super::{DayOfWeekEntry, Frequency, NormalizedOptions, RuleOptions};
use crate::date::{DateTime, Weekday};
use crate::error::{RuleOptionError, RuleResult};
use crate::rules::RuleModule;

/// Fields written by the frequency module, read by every later module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BaseOptions {
    pub(crate) start: DateTime,
    pub(crate) end: Option<DateTime>,
    pub(crate) count: Option<u32>,
    pub(crate) duration: Option<TimeDelta>,
    pub(crate) frequency: Frequency,
    pub(crate) interval: u32,
    pub(crate) week_start: Weekday,
}

/// Options normalized so far, filled in module order.
#[derive(Debug, Default)]
pub(crate) struct OptionsAccumulator {
    pub(crate) base: Option<BaseOptions>,
    pub(crate) by_month_of_year: Option<Vec<u32>>,
    pub(crate) by_day_of_year: Option<Vec<i32>>,
    pub(crate) by_day_of_month: Option<Vec<i32>>,
    pub(crate) by_day_of_week: Option<Vec<DayOfWeekEntry>>,
    pub(crate) by_hour_of_day: Option<Vec<u32>>,
    pub(crate) by_minute_of_hour: Option<Vec<u32>>,
    pub(crate) by_second_of_minute: Option<Vec<u32>>,
    pub(crate) by_millisecond_of_second: Option<Vec<u32>>,
}

impl OptionsAccumulator {
    /// ## Errors
    ///
    /// Returns `MissingFrequencyModule` if the frequency module has not run yet.
    pub(crate) fn base(&self) -> Result<BaseOptions, RuleOptionError> {
        self.base.ok_or(RuleOptionError::MissingFrequencyModule)
    }

    fn finish(self) -> Result<NormalizedOptions, RuleOptionError> {
        let base = self.base()?;
        Ok(NormalizedOptions {
            start: base.start,
            end: base.end,
            count: base.count,
            duration: base.duration,
            frequency: base.frequency,
            interval: base.interval,
            week_start: base.week_start,
            by_month_of_year: self.by_month_of_year,
            by_day_of_year: self.by_day_of_year,
            by_day_of_month: self.by_day_of_month,
            by_day_of_week: self.by_day_of_week,
            by_hour_of_day: self.by_hour_of_day,
            by_minute_of_hour: self.by_minute_of_hour,
            by_second_of_minute: self.by_second_of_minute,
            by_millisecond_of_second: self.by_millisecond_of_second,
        })
    }
}

/// ## Summary
/// Turns raw options into the canonical record consumed by the rule chain.
///
/// Modules are sorted by their declared dependencies first, then each one
/// validates and defaults the option it governs.
///
/// ## Errors
///
/// Returns a [`RuleOptionError`] for any invalid option, or for an option no
/// module in `modules` handles.
pub fn normalize_options(modules: &[RuleModule], raw: &RuleOptions) -> RuleResult<NormalizedOptions> {
    let order = RuleModule::resolve_order(modules)?;
    Ok(normalize_in_order(&order, raw)?)
}

/// Normalizes with an already dependency-sorted module list.
pub(crate) fn normalize_in_order(
    order: &[RuleModule],
    raw: &RuleOptions,
) -> Result<NormalizedOptions, RuleOptionError> {
    if let Some(unsupported) = RuleModule::ALL
        .into_iter()
        .find(|module| !order.contains(module) && module.is_present_in(raw))
    {
        return Err(RuleOptionError::UnsupportedOption {
            option: unsupported.option_name(),
        });
    }

    let mut accumulator = OptionsAccumulator::default();
    for module in order {
        module.normalize_options(raw, &mut accumulator)?;
    }
    let options = accumulator.finish()?;

    debug!(
        frequency = %options.frequency(),
        interval = options.interval(),
        start = %options.start(),
        "Normalized rule options"
    );

    Ok(options)
}

/// Rejects empty lists and entries for which `in_range` is false.
pub(crate) fn check_entries<T>(
    option: &'static str,
    values: &[T],
    in_range: impl Fn(i64) -> bool,
) -> Result<(), RuleOptionError>
where
    T: Copy + Into<i64>,
{
    if values.is_empty() {
        return Err(RuleOptionError::EmptyOption { option });
    }
    match values.iter().map(|value| (*value).into()).find(|value| !in_range(*value)) {
        Some(value) => Err(RuleOptionError::OutOfRange { option, value }),
        None => Ok(()),
    }
}

/// Ascending, duplicate-free copy of `values`.
pub(crate) fn sorted<T: Ord + Copy>(values: &[T]) -> Vec<T> {
    let mut values = values.to_vec();
    values.sort_unstable();
    values.dedup();
    values
}
