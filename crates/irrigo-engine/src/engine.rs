//! Trigger engine — the periodic loop that matches schedules against
//! wall-clock time and fires irrigation runs exactly once per eligible
//! minute.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::clock::{self, Clock};
use crate::dedup::FiredKeys;
use crate::runner::IrrigationRunner;
use crate::store::ScheduleStore;

/// One activation decided by an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledRun {
    pub schedule_id: String,
    pub duration_minutes: u32,
    /// `schedule:<id>` — identifies the origin in logs.
    pub label: String,
}

/// Evaluates stored schedules against the clock. Matching is exact
/// minute equality (`time == HH:MM` of now): a cadence above 60s would
/// skip eligible minutes, which is why the loop defaults to 30s.
pub struct TriggerEngine {
    store: ScheduleStore,
    clock: Arc<dyn Clock>,
    fired: FiredKeys,
}

impl TriggerEngine {
    pub fn new(store: ScheduleStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            fired: FiredKeys::new(),
        }
    }

    /// One discrete evaluation pass. Returns the runs that became due
    /// this pass; dispatching them is the caller's job so a slow pump
    /// can never stall evaluation.
    ///
    /// A store read failure already degrades to an empty set inside
    /// `ScheduleStore::load`, so a broken document costs one silent
    /// pass, never the loop.
    pub fn tick(&mut self) -> Vec<ScheduledRun> {
        let now = self.clock.now();
        let day = clock::weekday_index(&now);
        let hhmm = clock::clock_time(&now);
        let minute = clock::minute_stamp(&now);

        let mut due = Vec::new();
        for schedule in self.store.load() {
            if !schedule.enabled {
                continue;
            }
            if !schedule.days.contains(&day) {
                continue;
            }
            if schedule.time != hhmm {
                continue;
            }
            if self.fired.has_fired(&schedule.id, &minute) {
                continue;
            }
            // Mark before dispatch: a second sample of this minute must
            // never see an unmarked key.
            self.fired.mark_fired(&schedule.id, &minute);
            tracing::info!("🔔 Schedule triggered: {} at {minute}", schedule.id);
            due.push(ScheduledRun {
                label: format!("schedule:{}", schedule.id),
                schedule_id: schedule.id,
                duration_minutes: schedule.duration_minutes,
            });
        }

        self.fired.prune(&now);
        due
    }

    /// Number of dedup keys currently held.
    pub fn fired_key_count(&self) -> usize {
        self.fired.len()
    }
}

/// Run the trigger loop until process exit. Started once at service
/// startup; passes are serialized by construction (one loop, one lock),
/// while the runs themselves are dispatched fire-and-forget.
pub async fn spawn_trigger_loop(
    engine: Arc<Mutex<TriggerEngine>>,
    runner: IrrigationRunner,
    check_interval_secs: u64,
) {
    tracing::info!("⏰ Trigger loop started (check every {check_interval_secs}s)");
    if check_interval_secs > 60 {
        tracing::warn!(
            "⚠️ Check interval {check_interval_secs}s exceeds 60s — exact-minute schedules can be skipped"
        );
    }

    let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs));
    loop {
        interval.tick().await;

        let due = {
            let mut engine = engine.lock().await;
            engine.tick()
        };

        for run in due {
            let duration = Duration::from_secs(u64::from(run.duration_minutes) * 60);
            runner.spawn_timed(duration, run.label);
        }
    }
}
