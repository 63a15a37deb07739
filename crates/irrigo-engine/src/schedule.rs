//! Schedule definitions — the core data model for recurring irrigation.

use irrigo_core::error::{IrrigoError, Result};
use serde::{Deserialize, Serialize};

/// A recurring irrigation schedule.
///
/// Serialized field names match the persisted `schedules.json` document
/// exactly; the engine treats that format as fixed input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Unique id, assigned at creation, immutable.
    pub id: String,
    /// Weekdays the schedule fires on (0 = Sunday .. 6 = Saturday).
    pub days: Vec<u8>,
    /// Local clock time at minute granularity, `HH:MM`.
    pub time: String,
    /// Irrigation run length in minutes.
    pub duration_minutes: u32,
    /// Disabled schedules are never matched.
    pub enabled: bool,
}

/// Creation input — everything but the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    pub days: Vec<u8>,
    pub time: String,
    pub duration_minutes: u32,
    /// Defaults to enabled when omitted.
    pub enabled: Option<bool>,
}

/// Partial update — only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub days: Option<Vec<u8>>,
    pub time: Option<String>,
    pub duration_minutes: Option<u32>,
    pub enabled: Option<bool>,
}

impl Schedule {
    /// Build a new schedule from a draft, assigning a fresh id.
    pub fn create(draft: ScheduleDraft) -> Result<Self> {
        let schedule = Self {
            id: uuid::Uuid::new_v4().to_string(),
            days: draft.days,
            time: draft.time,
            duration_minutes: draft.duration_minutes,
            enabled: draft.enabled.unwrap_or(true),
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Apply a partial update, then re-validate the result.
    pub fn apply(&mut self, patch: SchedulePatch) -> Result<()> {
        let previous = self.clone();
        if let Some(days) = patch.days {
            self.days = days;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Err(e) = self.validate() {
            *self = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Check the schedule invariants: non-empty valid weekdays,
    /// `HH:MM` time, positive duration.
    pub fn validate(&self) -> Result<()> {
        if self.days.is_empty() {
            return Err(IrrigoError::Validation("days must be non-empty".into()));
        }
        if let Some(bad) = self.days.iter().find(|d| **d > 6) {
            return Err(IrrigoError::Validation(format!(
                "invalid weekday {bad} (expected 0=Sunday..6=Saturday)"
            )));
        }
        if !is_valid_hhmm(&self.time) {
            return Err(IrrigoError::Validation(format!(
                "time '{}' is not HH:MM (00:00–23:59)",
                self.time
            )));
        }
        if self.duration_minutes == 0 {
            return Err(IrrigoError::Validation(
                "durationMinutes must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Strict `HH:MM` check: two digits, colon, two digits, in range.
fn is_valid_hhmm(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let (Ok(hours), Ok(minutes)) = (time[..2].parse::<u8>(), time[3..].parse::<u8>()) else {
        return false;
    };
    time[..2].bytes().all(|b| b.is_ascii_digit())
        && time[3..].bytes().all(|b| b.is_ascii_digit())
        && hours <= 23
        && minutes <= 59
}
