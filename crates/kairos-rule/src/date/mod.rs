//! Date values consumed and produced by the recurrence engine.

mod adapter;
mod datetime;
mod weekday;

pub use adapter::{DateAdapter, resolve_local};
pub use datetime::{DateField, DateTime, TimeUnit};
pub use weekday::Weekday;
