use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::date::DateTime;

/// One produced date, with the rule's duration attached when it has one.
///
/// The duration is serialized as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: DateTime,
    #[serde(
        default,
        with = "crate::options::duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<TimeDelta>,
}

impl Occurrence {
    #[must_use]
    pub const fn new(date: DateTime, duration: Option<TimeDelta>) -> Self {
        Self { date, duration }
    }

    /// `date + duration`, or `None` for instantaneous occurrences.
    #[must_use]
    pub fn end(&self) -> Option<DateTime> {
        self.duration.map(|duration| self.date.add_duration(duration))
    }

    /// Whether `date` lies in `[self.date, self.end())`, or equals `self.date`
    /// when there is no duration.
    #[must_use]
    pub fn contains(&self, date: DateTime) -> bool {
        match self.end() {
            Some(end) => self.date <= date && date < end,
            None => self.date == date,
        }
    }
}
