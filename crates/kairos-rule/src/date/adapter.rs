//! Conversion between external date types and the engine's [`DateTime`].
//!
//! Rules run on wall-clock values. An adapter reads the local wall-clock time
//! out of a zoned value and, on the way back, resolves that wall-clock time
//! against the zone again, which is where DST folds and gaps are handled.

use chrono::{LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};

use super::DateTime;

/// A date type the engine can consume and produce.
pub trait DateAdapter: Sized {
    /// Context needed to turn a wall-clock value back into `Self`.
    type Zone: Clone;

    /// The zone this value is expressed in.
    fn zone(&self) -> Self::Zone;

    /// Wall-clock view of this value.
    fn to_date_time(&self) -> DateTime;

    /// Rebuilds a value in `zone` from a wall-clock value.
    fn from_date_time(date: DateTime, zone: &Self::Zone) -> Self;
}

impl DateAdapter for NaiveDateTime {
    type Zone = ();

    fn zone(&self) -> Self::Zone {}

    fn to_date_time(&self) -> DateTime {
        DateTime::new(*self)
    }

    fn from_date_time(date: DateTime, _zone: &Self::Zone) -> Self {
        date.naive()
    }
}

impl<Tz: TimeZone> DateAdapter for chrono::DateTime<Tz> {
    type Zone = Tz;

    fn zone(&self) -> Self::Zone {
        self.timezone()
    }

    fn to_date_time(&self) -> DateTime {
        DateTime::new(self.naive_local())
    }

    fn from_date_time(date: DateTime, zone: &Self::Zone) -> Self {
        resolve_local(zone, date.naive())
    }
}

/// ## Summary
/// Resolves a wall-clock time in `zone`.
///
/// A time inside a DST fold maps to its earlier instant. A time inside a DST
/// gap keeps the UTC offset in force before the gap, which lands it after the
/// gap by the gap's length (RFC 5545 §3.3.5).
#[must_use]
pub fn resolve_local<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> chrono::DateTime<Tz> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let offset_before = local
                .checked_sub_signed(TimeDelta::hours(24))
                .and_then(|before| zone.offset_from_local_datetime(&before).earliest())
                .map(|offset| offset.fix());
            let utc = offset_before
                .and_then(|offset| local.checked_sub_offset(offset))
                .unwrap_or(local);
            tracing::trace!(%local, %utc, "Wall-clock time falls in a DST gap");
            zone.from_utc_datetime(&utc)
        }
    }
}
