//! Fired-key tracking — prevents a schedule from firing twice within
//! the same calendar minute when the loop samples that minute more
//! than once.
//!
//! Purely in-memory: a restart clears history, which at minute
//! granularity means at most one re-fire in the restart minute.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};

const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// In-memory set of (schedule id, calendar minute) pairs already fired.
#[derive(Debug, Default)]
pub struct FiredKeys {
    keys: HashSet<String>,
}

impl FiredKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this schedule already fired in this calendar minute?
    pub fn has_fired(&self, schedule_id: &str, minute: &str) -> bool {
        self.keys.contains(&compose(schedule_id, minute))
    }

    /// Record a firing. Call before dispatching the run so a second
    /// sample of the same minute can never race past the check.
    pub fn mark_fired(&mut self, schedule_id: &str, minute: &str) {
        self.keys.insert(compose(schedule_id, minute));
    }

    /// Drop every key whose minute stamp is 24h or older relative to
    /// `now`, bounding memory growth. Unparseable stamps are dropped too.
    pub fn prune(&mut self, now: &NaiveDateTime) {
        let cutoff = *now - Duration::hours(24);
        self.keys.retain(|key| match parse_minute(key) {
            Some(minute) => minute > cutoff,
            None => false,
        });
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn compose(schedule_id: &str, minute: &str) -> String {
    format!("{schedule_id}|{minute}")
}

/// Extract the minute stamp from a stored key. The stamp is the
/// fixed-width suffix, so schedule ids containing `|` stay harmless.
fn parse_minute(key: &str) -> Option<NaiveDateTime> {
    let (_, stamp) = key.rsplit_once('|')?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}
