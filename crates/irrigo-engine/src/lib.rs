//! # Irrigo Engine
//!
//! The schedule trigger engine — evaluates stored weekday/time schedules
//! against wall-clock time and turns matches into bounded pump runs.
//!
//! ## Architecture
//! ```text
//! TriggerEngine (tokio interval, one pass every 30s)
//!   ├── ScheduleStore: schedules.json → Vec<Schedule>
//!   ├── Clock: current local time → (weekday, HH:MM, minute stamp)
//!   ├── FiredKeys: (schedule id, minute stamp) dedup + 24h pruning
//!   └── match → IrrigationRunner
//!                 ├── pump ON (duration hint on the wire)
//!                 └── detached task: sleep(duration) → pump OFF
//! ```
//!
//! Matching is exact-minute string equality; the evaluation cadence must
//! stay at or below 60s so every eligible minute is sampled at least once.

pub mod actuator;
pub mod clock;
pub mod dedup;
pub mod engine;
pub mod runner;
pub mod schedule;
pub mod store;

pub use actuator::{PumpActuator, PumpState, PumpStatus};
pub use clock::{Clock, SystemClock};
pub use dedup::FiredKeys;
pub use engine::{ScheduledRun, TriggerEngine, spawn_trigger_loop};
pub use runner::{IrrigationRunner, MANUAL_MAX_SECS, MANUAL_MIN_SECS, validate_manual_duration};
pub use schedule::{Schedule, ScheduleDraft, SchedulePatch};
pub use store::ScheduleStore;
