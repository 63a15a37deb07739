//! File-based schedule store — lightweight persistence.
//! Schedules saved as one JSON document, human-readable and
//! hand-editable. The trigger loop only ever reads; all writes come
//! from the HTTP CRUD path.

use std::path::{Path, PathBuf};

use irrigo_core::error::{IrrigoError, Result};

use crate::schedule::{Schedule, SchedulePatch};

/// File-based schedule store.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            path: dir.join("schedules.json"),
        }
    }

    /// Default store directory (~/.irrigo).
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".irrigo")
    }

    /// Load all schedules. Any read or parse failure degrades to an
    /// empty set so a broken document never stops the trigger loop.
    pub fn load(&self) -> Vec<Schedule> {
        if !self.path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse {}: {e}", self.path.display());
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Save the full schedule set to disk.
    pub fn save(&self, schedules: &[Schedule]) -> Result<()> {
        let json = serde_json::to_string_pretty(schedules)
            .map_err(|e| IrrigoError::Store(format!("Serialize error: {e}")))?;
        std::fs::write(&self.path, &json)
            .map_err(|e| IrrigoError::Store(format!("Write error: {e}")))?;
        tracing::debug!(
            "💾 Saved {} schedule(s) to {}",
            schedules.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append a validated schedule.
    pub fn add(&self, schedule: Schedule) -> Result<Schedule> {
        schedule.validate()?;
        let mut schedules = self.load();
        schedules.push(schedule.clone());
        self.save(&schedules)?;
        Ok(schedule)
    }

    /// Patch an existing schedule by id.
    pub fn update(&self, id: &str, patch: SchedulePatch) -> Result<Schedule> {
        let mut schedules = self.load();
        let Some(schedule) = schedules.iter_mut().find(|s| s.id == id) else {
            return Err(IrrigoError::NotFound(format!("schedule {id}")));
        };
        schedule.apply(patch)?;
        let updated = schedule.clone();
        self.save(&schedules)?;
        Ok(updated)
    }

    /// Remove a schedule by id.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut schedules = self.load();
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        if schedules.len() == before {
            return Err(IrrigoError::NotFound(format!("schedule {id}")));
        }
        self.save(&schedules)
    }
}
