use thiserror::Error;

use crate::options::Frequency;

/// Malformed or contradictory rule options, raised during normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleOptionError {
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("\"interval\" expects a whole number greater than 0, got {0}")]
    InvalidInterval(u32),

    #[error("\"{option}\" expects a non-empty list")]
    EmptyOption { option: &'static str },

    #[error("\"{option}\" entry {value} is out of range")]
    OutOfRange { option: &'static str, value: i64 },

    #[error("\"{option}\" cannot be used with {frequency} frequency")]
    IncompatibleFrequency {
        option: &'static str,
        frequency: Frequency,
    },

    #[error("\"byDayOfWeek\" entry {entry} can only carry an occurrence number with MONTHLY or YEARLY frequency")]
    NthNotAllowed { entry: String },

    #[error("\"{option}\" is not handled by any of the configured rule modules")]
    UnsupportedOption { option: &'static str },

    #[error("The rule module list must include the frequency module")]
    MissingFrequencyModule,
}

/// Rule combinations found to be unrepresentable or non-converging while iterating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRuleError {
    #[error("{rule} Infinite while loop")]
    InfiniteLoop { rule: &'static str },

    #[error("{rule} rule appears to contain an impossible combination")]
    ImpossibleCombination { rule: &'static str },

    #[error("{rule} contains no value a date can take")]
    NoRepresentableValue { rule: &'static str },

    #[error("Failed to find a valid occurrence after {passes} consecutive invalid passes")]
    TooManyInvalidPasses { passes: u32 },

    #[error("Reverse iteration needs an end date or a count")]
    InfiniteReverse,
}

/// Errors surfaced by the recurrence engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error(transparent)]
    RuleOption(#[from] RuleOptionError),

    #[error(transparent)]
    RecurrenceRule(#[from] RecurrenceRuleError),

    #[error(transparent)]
    CoreError(#[from] kairos_core::error::CoreError),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;
