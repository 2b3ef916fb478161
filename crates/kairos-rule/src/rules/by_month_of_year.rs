//! Month-of-year normalization. Evaluation is shared with the other
//! field rules through [`super::TimeOfUnitRule`].

use super::time_of_unit::MONTH_OF_YEAR;
use crate::date::DateField;
use crate::error::RuleOptionError;
use crate::options::{Frequency, OptionsAccumulator, RuleOptions};

/// Defaults to the start month only for YEARLY rules with no day option,
/// so a plain yearly rule repeats on its anniversary.
pub(crate) fn normalize_options(
    raw: &RuleOptions,
    accumulator: &mut OptionsAccumulator,
) -> Result<(), RuleOptionError> {
    let base = accumulator.base()?;
    let has_day_option = raw.by_day_of_month.is_some()
        || raw.by_day_of_week.is_some()
        || raw.by_day_of_year.is_some();

    accumulator.by_month_of_year = match raw.by_month_of_year.as_deref() {
        Some(months) => MONTH_OF_YEAR.normalize(Some(months), base)?,
        None if base.frequency == Frequency::Yearly && !has_day_option => {
            Some(vec![u32::try_from(base.start.get(DateField::Month)).unwrap_or(1)])
        }
        None => None,
    };
    Ok(())
}
