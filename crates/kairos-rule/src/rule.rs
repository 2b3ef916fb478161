//! High-level entry point: one immutable recurrence rule.

use std::iter::Take;
use std::sync::Arc;

use kairos_core::config::{ExpansionConfig, Settings};

use crate::date::{DateTime, TimeUnit};
use crate::error::RuleResult;
use crate::iterator::{IteratorArgs, RecurrenceRulesIterator};
use crate::occurrence::Occurrence;
use crate::options::{NormalizedOptions, RuleOptions};
use crate::reducer::RecurrenceRuleReducer;
use crate::rules::RuleModule;

/// Bounds for [`Rule::occurrences`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrenceArgs {
    pub start: Option<DateTime>,
    /// Inclusive.
    pub end: Option<DateTime>,
    pub reverse: bool,
    /// Maximum number of occurrences to yield.
    pub take: Option<usize>,
}

/// A validated recurrence rule.
///
/// Options are normalized once at construction, so every iterator shares
/// them. To change a rule, build a new one from [`Rule::raw_options`].
///
/// ```
/// use kairos_rule::{Frequency, Rule, RuleOptions};
///
/// let start = "2020-01-01T09:00:00".parse().unwrap();
/// let rule = Rule::new(RuleOptions::new(Frequency::Daily, start).with_count(2)).unwrap();
/// let dates: Vec<_> = rule.all().unwrap().into_iter().map(|o| o.date.to_string()).collect();
/// assert_eq!(dates, ["2020-01-01T09:00:00", "2020-01-02T09:00:00"]);
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    raw: RuleOptions,
    options: Arc<NormalizedOptions>,
    reducer: RecurrenceRuleReducer,
    expansion: ExpansionConfig,
}

impl Rule {
    /// Creates a rule evaluated by every built-in module.
    ///
    /// ## Errors
    ///
    /// Returns a `RuleOptionError` if the options are invalid.
    pub fn new(options: RuleOptions) -> RuleResult<Self> {
        Self::with_modules(&RuleModule::ALL, options)
    }

    /// Creates a rule evaluated only by `modules`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the module list lacks the frequency module, or if
    /// the options are invalid or use an option none of `modules` handles.
    pub fn with_modules(modules: &[RuleModule], options: RuleOptions) -> RuleResult<Self> {
        let reducer = RecurrenceRuleReducer::new(modules)?;
        let normalized = reducer.normalize(&options)?;
        Ok(Self {
            raw: options,
            options: Arc::new(normalized),
            reducer,
            expansion: ExpansionConfig::default(),
        })
    }

    /// Applies expansion limits from `settings`.
    ///
    /// ## Errors
    ///
    /// Returns `CoreError::InvalidConfiguration` for unusable limits.
    pub fn with_settings(mut self, settings: &Settings) -> RuleResult<Self> {
        settings.expansion.validate()?;
        self.expansion = settings.expansion;
        Ok(self)
    }

    #[must_use]
    pub const fn raw_options(&self) -> &RuleOptions {
        &self.raw
    }

    #[must_use]
    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.options.end().is_none() && self.options.count().is_none()
    }

    /// Iterates forward from the rule start.
    ///
    /// ## Errors
    ///
    /// See [`RecurrenceRulesIterator::new`].
    #[expect(
        clippy::iter_not_returning_iterator,
        reason = "Construction can fail, the iterator is behind a Result"
    )]
    pub fn iter(&self) -> RuleResult<RecurrenceRulesIterator> {
        self.iterator(IteratorArgs::default())
    }

    /// Iterates within caller bounds.
    ///
    /// ## Errors
    ///
    /// See [`RecurrenceRulesIterator::new`].
    pub fn occurrences(&self, args: OccurrenceArgs) -> RuleResult<Take<RecurrenceRulesIterator>> {
        let iterator = self.iterator(IteratorArgs {
            start: args.start,
            end: args.end,
            reverse: args.reverse,
            max_invalid_passes: None,
        })?;
        Ok(iterator.take(args.take.unwrap_or(usize::MAX)))
    }

    /// Collects every occurrence. Rules with neither an end nor a count stop
    /// after `max_occurrences`.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn all(&self) -> RuleResult<Vec<Occurrence>> {
        let iterator = self.iter()?;
        let limit = if iterator.is_infinite() {
            self.expansion.max_occurrences
        } else {
            usize::MAX
        };
        iterator.take(limit).collect()
    }

    /// Whether `date` is exactly an occurrence.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn occurs_at(&self, date: DateTime) -> RuleResult<bool> {
        let mut iterator = self.iter()?;
        Ok(iterator
            .skip_to(date)
            .transpose()?
            .is_some_and(|occurrence| occurrence.date == date))
    }

    /// Whether any occurrence falls on the calendar day of `date`.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn occurs_on(&self, date: DateTime) -> RuleResult<bool> {
        let week_start = self.options.week_start();
        self.occurs_between(
            date.granularity(TimeUnit::Day, week_start),
            date.end_granularity(TimeUnit::Day, week_start),
        )
    }

    /// Whether any occurrence lies in `[start, end]`.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn occurs_between(&self, start: DateTime, end: DateTime) -> RuleResult<bool> {
        self.any(IteratorArgs {
            start: Some(start),
            end: Some(end),
            ..IteratorArgs::default()
        })
    }

    /// Whether any occurrence lies at or after `date`.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn occurs_after(&self, date: DateTime) -> RuleResult<bool> {
        self.any(IteratorArgs {
            start: Some(date),
            ..IteratorArgs::default()
        })
    }

    /// Whether any occurrence lies at or before `date`.
    ///
    /// ## Errors
    ///
    /// Returns the first error met while iterating.
    pub fn occurs_before(&self, date: DateTime) -> RuleResult<bool> {
        self.any(IteratorArgs {
            end: Some(date),
            ..IteratorArgs::default()
        })
    }

    fn any(&self, args: IteratorArgs) -> RuleResult<bool> {
        let mut iterator = self.iterator(args)?;
        Ok(iterator.next().transpose()?.is_some())
    }

    fn iterator(&self, args: IteratorArgs) -> RuleResult<RecurrenceRulesIterator> {
        RecurrenceRulesIterator::new(
            &self.reducer,
            Arc::clone(&self.options),
            IteratorArgs {
                max_invalid_passes: args
                    .max_invalid_passes
                    .or(Some(self.expansion.max_invalid_passes)),
                ..args
            },
        )
    }
}
