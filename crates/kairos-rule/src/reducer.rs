//! Builds the active rule chain for one iterator.

use tracing::debug;

use crate::date::DateTime;
use crate::error::{RecurrenceRuleError, RuleResult};
use crate::options::{NormalizedOptions, RuleOptions, normalize_in_order};
use crate::rules::{Direction, FrequencyRule, RecurrenceRuleResult, RuleInstance, RuleModule};

/// Dependency-sorted module list shared by normalization and evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRuleReducer {
    modules: Vec<RuleModule>,
}

impl Default for RecurrenceRuleReducer {
    fn default() -> Self {
        Self {
            modules: RuleModule::ALL.to_vec(),
        }
    }
}

impl RecurrenceRuleReducer {
    /// ## Errors
    ///
    /// Returns an error if `modules` lacks the frequency module or its
    /// dependencies cannot be ordered.
    pub fn new(modules: &[RuleModule]) -> RuleResult<Self> {
        Ok(Self {
            modules: RuleModule::resolve_order(modules)?,
        })
    }

    #[must_use]
    pub fn modules(&self) -> &[RuleModule] {
        &self.modules
    }

    /// ## Errors
    ///
    /// Returns a `RuleOptionError` for invalid or unsupported options.
    pub fn normalize(&self, raw: &RuleOptions) -> RuleResult<NormalizedOptions> {
        Ok(normalize_in_order(&self.modules, raw)?)
    }

    /// Instantiates every module whose option is present, in dependency
    /// order, around a fresh frequency rule.
    pub(crate) fn reduce(&self, options: &NormalizedOptions, direction: Direction) -> RuleChain {
        let rules: Vec<RuleInstance> = self
            .modules
            .iter()
            .filter_map(|module| module.instantiate(options, direction))
            .collect();
        debug!(active = rules.len(), ?direction, "Reduced rule chain");

        RuleChain {
            frequency: FrequencyRule::new(options, direction),
            rules,
        }
    }
}

/// Rules bound to one iterator, sharing a single frequency window.
#[derive(Debug, Clone)]
pub(crate) struct RuleChain {
    frequency: FrequencyRule,
    rules: Vec<RuleInstance>,
}

impl RuleChain {
    /// One pass over the chain. Returns the first invalid result, or
    /// `Valid(date)` if every rule accepts the date.
    pub(crate) fn run(&mut self, date: DateTime) -> Result<RecurrenceRuleResult, RecurrenceRuleError> {
        for rule in &self.rules {
            let result = rule.run(date, &mut self.frequency)?;
            if !result.is_valid() {
                return Ok(result);
            }
        }
        Ok(RecurrenceRuleResult::Valid(date))
    }
}
