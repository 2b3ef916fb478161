//! Recurrence rule expansion in the style of RFC 5545 RRULE.
//!
//! - `date`: wall-clock date value and conversions to zoned types
//! - `options`: raw and normalized rule options
//! - `rules`: the frequency rule and the eight `by*` constraint rules
//! - `reducer`: builds the active rule chain for an iterator
//! - `iterator`: lazy, bidirectional occurrence iterator
//! - `rule`: high-level [`Rule`] facade

pub mod date;
pub mod error;
pub mod iterator;
pub mod occurrence;
pub mod options;
pub mod reducer;
pub mod rule;
pub mod rules;

pub use date::{DateAdapter, DateField, DateTime, TimeUnit, Weekday};
pub use error::{RecurrenceRuleError, RuleError, RuleOptionError, RuleResult};
pub use iterator::{Adapted, IteratorArgs, RecurrenceRulesIterator};
pub use occurrence::Occurrence;
pub use options::{DayOfWeekEntry, Frequency, NormalizedOptions, RuleOptions, normalize_options};
pub use reducer::RecurrenceRuleReducer;
pub use rule::{OccurrenceArgs, Rule};
pub use rules::{Direction, RecurrenceRuleResult, RuleModule};
