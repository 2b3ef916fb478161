//! Lazy occurrence generation over a rule chain.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

use kairos_core::config::DEFAULT_MAX_INVALID_PASSES;
use tracing::{debug, trace, warn};

use crate::date::{DateAdapter, DateTime, TimeUnit};
use crate::error::{RecurrenceRuleError, RuleError, RuleResult};
use crate::occurrence::Occurrence;
use crate::options::NormalizedOptions;
use crate::reducer::{RecurrenceRuleReducer, RuleChain};
use crate::rules::{Direction, RecurrenceRuleResult};

/// Caller bounds for one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IteratorArgs {
    /// Earliest date to produce; never before the rule start.
    pub start: Option<DateTime>,
    /// Latest date to produce (inclusive).
    pub end: Option<DateTime>,
    pub reverse: bool,
    /// Consecutive rejected candidates tolerated before giving up.
    pub max_invalid_passes: Option<u32>,
}

/// Produces occurrences in chronological (or reverse) order without ever
/// materializing the sequence.
///
/// Each candidate runs through every rule; any rejection replaces the
/// candidate with the rule's suggestion and restarts the pass. The iterator
/// fuses after its bound or after the first error.
#[derive(Debug, Clone)]
pub struct RecurrenceRulesIterator {
    reducer: RecurrenceRuleReducer,
    options: Arc<NormalizedOptions>,
    chain: RuleChain,
    direction: Direction,
    start: DateTime,
    end: Option<DateTime>,
    /// Occurrences left while the count is consumed lazily.
    remaining: Option<u32>,
    cursor: Option<DateTime>,
    max_invalid_passes: u32,
}

impl RecurrenceRulesIterator {
    /// ## Summary
    /// Resolves the effective bounds and seeds the first candidate.
    ///
    /// Forward iteration from the rule start consumes `count` as it goes.
    /// Any other combination of `count` with reverse iteration or a later
    /// start first runs the rule forward to find the date of its last
    /// occurrence, then uses that date as the end bound.
    ///
    /// ## Errors
    ///
    /// Returns `InfiniteReverse` for reverse iteration without an end or a
    /// count, or any error met while locating the count terminus.
    pub fn new(
        reducer: &RecurrenceRuleReducer,
        options: Arc<NormalizedOptions>,
        args: IteratorArgs,
    ) -> RuleResult<Self> {
        let direction = if args.reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        let max_invalid_passes = args.max_invalid_passes.unwrap_or(DEFAULT_MAX_INVALID_PASSES);
        let start = args
            .start
            .map_or(options.start(), |start| start.max(options.start()));
        let mut end = earliest(options.end(), args.end);
        let mut remaining = options.count();
        let mut exhausted = remaining == Some(0);

        if let Some(count) = remaining
            && count > 0
            && (args.reverse || start != options.start())
        {
            match terminus(reducer, &options, count, max_invalid_passes)? {
                Some(last) => end = earliest(end, Some(last)),
                None => exhausted = true,
            }
            remaining = None;
        }

        if args.reverse && end.is_none() {
            warn!("Refusing to iterate an unbounded rule in reverse");
            return Err(RecurrenceRuleError::InfiniteReverse.into());
        }

        let cursor = if exhausted {
            None
        } else {
            match direction {
                Direction::Forward => Some(start),
                Direction::Reverse => end,
            }
        };

        debug!(
            %start,
            end = ?end,
            reverse = args.reverse,
            is_infinite = end.is_none() && options.count().is_none(),
            count = ?remaining,
            "Created recurrence iterator"
        );

        Ok(Self {
            reducer: reducer.clone(),
            chain: reducer.reduce(&options, direction),
            options,
            direction,
            start,
            end,
            remaining,
            cursor,
            max_invalid_passes,
        })
    }

    /// Effective lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime {
        self.start
    }

    /// Effective upper bound, including the bound implied by `count` when it
    /// has been resolved.
    #[must_use]
    pub const fn end(&self) -> Option<DateTime> {
        self.end
    }

    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        self.direction.is_reverse()
    }

    /// True when neither an end nor a count bounds the sequence.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.end.is_none() && self.options.count().is_none()
    }

    #[must_use]
    pub fn has_duration(&self) -> bool {
        self.options.duration().is_some()
    }

    #[must_use]
    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    /// ## Summary
    /// Returns the first occurrence at or beyond `date` in the iteration
    /// direction, skipping everything before it.
    ///
    /// Equivalent to calling [`Iterator::next`] until such an occurrence
    /// appears. A `date` behind the current position behaves like `next`.
    pub fn skip_to(&mut self, date: DateTime) -> Option<RuleResult<Occurrence>> {
        let cursor = self.cursor?;
        let ahead = match self.direction {
            Direction::Forward => date > cursor,
            Direction::Reverse => date < cursor,
        };
        if !ahead {
            return self.next();
        }

        if let Some(remaining) = self.remaining {
            // Skipped occurrences still count, so bound by date instead.
            if let Err(err) = self.resolve_count(remaining) {
                self.cursor = None;
                return Some(Err(err));
            }
            self.cursor?;
        }
        self.advance(date)
    }

    /// Converts the lazily consumed count into an end bound.
    fn resolve_count(&mut self, remaining: u32) -> RuleResult<()> {
        let count = self.options.count().unwrap_or(remaining);
        match terminus(&self.reducer, &self.options, count, self.max_invalid_passes)? {
            Some(last) => self.end = earliest(self.end, Some(last)),
            None => self.cursor = None,
        }
        self.remaining = None;
        Ok(())
    }

    /// Converts into an iterator of adapter values in `zone`.
    #[must_use]
    pub fn adapt<T: DateAdapter>(self, zone: T::Zone) -> Adapted<T> {
        Adapted {
            inner: self,
            zone,
            marker: PhantomData,
        }
    }

    fn out_of_bounds(&self, date: DateTime) -> bool {
        // Saturated arithmetic pins dates to the range edges.
        date == DateTime::MAX
            || date == DateTime::MIN
            || date < self.start
            || self.end.is_some_and(|end| date > end)
    }

    /// Runs the fixed-point loop from `seed` until a date passes every rule.
    fn advance(&mut self, seed: DateTime) -> Option<RuleResult<Occurrence>> {
        if self.remaining == Some(0) {
            self.cursor = None;
            return None;
        }

        let mut candidate = seed;
        let mut invalid_passes: u32 = 0;
        let date = loop {
            if self.out_of_bounds(candidate) {
                self.cursor = None;
                return None;
            }
            match self.chain.run(candidate) {
                Ok(RecurrenceRuleResult::Valid(date)) => break date,
                Ok(RecurrenceRuleResult::Invalid(next)) => {
                    invalid_passes += 1;
                    trace!(%candidate, %next, invalid_passes, "Candidate rejected");
                    if invalid_passes >= self.max_invalid_passes {
                        warn!(%seed, passes = invalid_passes, "Recurrence rule did not converge");
                        self.cursor = None;
                        return Some(Err(RecurrenceRuleError::TooManyInvalidPasses {
                            passes: invalid_passes,
                        }
                        .into()));
                    }
                    candidate = next;
                }
                Err(err) => {
                    warn!(%candidate, %err, "Recurrence rule failed");
                    self.cursor = None;
                    return Some(Err(RuleError::from(err)));
                }
            }
        };

        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        let next = match self.direction {
            Direction::Forward => date.add(1, TimeUnit::Millisecond),
            Direction::Reverse => date.subtract(1, TimeUnit::Millisecond),
        };
        self.cursor = (next != date).then_some(next);
        Some(Ok(Occurrence::new(date, self.options.duration())))
    }
}

impl Iterator for RecurrenceRulesIterator {
    type Item = RuleResult<Occurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        let seed = self.cursor?;
        self.advance(seed)
    }
}

impl FusedIterator for RecurrenceRulesIterator {}

/// Occurrences converted to a [`DateAdapter`] type.
#[derive(Debug, Clone)]
pub struct Adapted<T: DateAdapter> {
    inner: RecurrenceRulesIterator,
    zone: T::Zone,
    marker: PhantomData<fn() -> T>,
}

impl<T: DateAdapter> Adapted<T> {
    /// Advances like [`RecurrenceRulesIterator::skip_to`].
    pub fn skip_to(&mut self, date: &T) -> Option<RuleResult<T>> {
        let zone = &self.zone;
        self.inner
            .skip_to(date.to_date_time())
            .map(|result| result.map(|occurrence| T::from_date_time(occurrence.date, zone)))
    }
}

impl<T: DateAdapter> Iterator for Adapted<T> {
    type Item = RuleResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let zone = &self.zone;
        self.inner
            .next()
            .map(|result| result.map(|occurrence| T::from_date_time(occurrence.date, zone)))
    }
}

impl<T: DateAdapter> FusedIterator for Adapted<T> {}

fn earliest(a: Option<DateTime>, b: Option<DateTime>) -> Option<DateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Date of the `count`th occurrence from the rule start, or the last one if
/// the rule ends sooner.
fn terminus(
    reducer: &RecurrenceRuleReducer,
    options: &Arc<NormalizedOptions>,
    count: u32,
    max_invalid_passes: u32,
) -> RuleResult<Option<DateTime>> {
    let forward = RecurrenceRulesIterator::new(
        reducer,
        Arc::clone(options),
        IteratorArgs {
            max_invalid_passes: Some(max_invalid_passes),
            ..IteratorArgs::default()
        },
    )?;

    let mut last = None;
    for occurrence in forward.take(usize::try_from(count).unwrap_or(usize::MAX)) {
        last = Some(occurrence?.date);
    }
    trace!(count, ?last, "Resolved count terminus");
    Ok(last)
}
