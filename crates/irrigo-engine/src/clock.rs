//! Clock source abstraction — lets tests drive the engine with a
//! synthetic time instead of the host's wall clock.
//!
//! All times are local naive wall-clock times; the engine does no
//! timezone conversion.

use chrono::{Datelike, Local, NaiveDateTime};

/// Supplies the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The host's real clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Weekday index with Sunday = 0 .. Saturday = 6.
pub fn weekday_index(now: &NaiveDateTime) -> u8 {
    now.weekday().num_days_from_sunday() as u8
}

/// Recurring clock time, `HH:MM`.
pub fn clock_time(now: &NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}

/// Calendar-minute stamp, `YYYY-MM-DDTHH:MM` — identifies one specific
/// minute occurrence, not a recurring time of day.
pub fn minute_stamp(now: &NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M").to_string()
}
