//! Irrigation runner — turns an activation request into a bounded pump
//! session: ON now, OFF after the requested duration.
//!
//! The firmware is strictly stateless on/off, so deactivation is owned
//! here: every successful ON spawns exactly one detached task that
//! sleeps the duration and issues the OFF command.

use std::sync::Arc;
use std::time::Duration;

use irrigo_core::error::{IrrigoError, Result};

use crate::actuator::{PumpActuator, PumpState};

/// Manual run duration bounds, in seconds.
pub const MANUAL_MIN_SECS: u64 = 1;
pub const MANUAL_MAX_SECS: u64 = 7200;

/// How long to wait before the single OFF retry.
const OFF_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Reject manual durations outside [1s, 2h] before they reach the runner.
pub fn validate_manual_duration(duration_seconds: u64) -> Result<Duration> {
    if !(MANUAL_MIN_SECS..=MANUAL_MAX_SECS).contains(&duration_seconds) {
        return Err(IrrigoError::Validation(format!(
            "durationSeconds must be between {MANUAL_MIN_SECS} and {MANUAL_MAX_SECS}"
        )));
    }
    Ok(Duration::from_secs(duration_seconds))
}

/// Drives one timed pump session per call. Cheap to clone; safe to call
/// concurrently for different labels (the pump commands are idempotent).
#[derive(Clone)]
pub struct IrrigationRunner {
    pump: Arc<dyn PumpActuator>,
}

impl IrrigationRunner {
    pub fn new(pump: Arc<dyn PumpActuator>) -> Self {
        Self { pump }
    }

    /// Start a timed run: pump ON, then OFF after `duration` via a
    /// detached task. Returns once the ON command has been acknowledged;
    /// an ON failure is returned to the caller and nothing is scheduled.
    /// No retry — a failed scheduled run simply waits for its next
    /// matching minute.
    pub async fn run_timed(&self, duration: Duration, label: &str) -> Result<()> {
        tracing::info!("💧 [{label}] Pump ON for {}s", duration.as_secs());

        if let Err(e) = self.pump.set_state(PumpState::On, Some(duration)).await {
            tracing::error!("❌ [{label}] Failed to start pump: {e}");
            return Err(e);
        }

        let pump = self.pump.clone();
        let label = label.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Err(e) = pump.set_state(PumpState::Off, None).await {
                tracing::warn!("⚠️ [{label}] Pump OFF failed, retrying once: {e}");
                tokio::time::sleep(OFF_RETRY_DELAY).await;
                if let Err(e) = pump.set_state(PumpState::Off, None).await {
                    tracing::error!("❌ [{label}] Pump OFF retry failed — pump may still be running: {e}");
                } else {
                    tracing::info!("💧 [{label}] Pump OFF (after retry)");
                }
            } else {
                tracing::info!("💧 [{label}] Pump OFF");
            }
        });

        Ok(())
    }

    /// Fire-and-forget variant for the trigger loop: a slow or hung
    /// pump call must never delay the next evaluation pass.
    pub fn spawn_timed(&self, duration: Duration, label: String) {
        let runner = self.clone();
        tokio::spawn(async move {
            // Failure already logged; scheduled runs are never retried.
            let _ = runner.run_timed(duration, &label).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::PumpStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Recording fake: every set_state call is appended; ON calls can
    /// be made to fail, or the first OFF call only.
    struct MockPump {
        calls: Mutex<Vec<PumpState>>,
        fail_on: bool,
        fail_first_off: bool,
    }

    impl MockPump {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: false,
                fail_first_off: false,
            })
        }

        fn failing_on() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: true,
                fail_first_off: false,
            })
        }

        fn flaky_off() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: false,
                fail_first_off: true,
            })
        }

        fn calls(&self) -> Vec<PumpState> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PumpActuator for MockPump {
        async fn set_state(&self, state: PumpState, _hint: Option<Duration>) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(state);
            if state == PumpState::On && self.fail_on {
                return Err(IrrigoError::Actuator("boom".into()));
            }
            let off_count = calls.iter().filter(|s| **s == PumpState::Off).count();
            if state == PumpState::Off && self.fail_first_off && off_count == 1 {
                return Err(IrrigoError::Actuator("off failed".into()));
            }
            Ok(())
        }

        async fn status(&self) -> Result<PumpStatus> {
            Ok(PumpStatus {
                state: "idle".into(),
            })
        }
    }

    #[test]
    fn manual_duration_bounds() {
        assert!(validate_manual_duration(0).is_err());
        assert!(validate_manual_duration(1).is_ok());
        assert!(validate_manual_duration(7200).is_ok());
        assert!(validate_manual_duration(7201).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn on_then_off_after_duration() {
        let pump = MockPump::ok();
        let runner = IrrigationRunner::new(pump.clone());
        runner
            .run_timed(Duration::from_secs(600), "timed-manual")
            .await
            .unwrap();
        assert_eq!(pump.calls(), vec![PumpState::On]);

        // Just before the deadline the pump is still on.
        tokio::time::sleep(Duration::from_secs(599)).await;
        assert_eq!(pump.calls(), vec![PumpState::On]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(pump.calls(), vec![PumpState::On, PumpState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn on_failure_surfaces_and_schedules_nothing() {
        let pump = MockPump::failing_on();
        let runner = IrrigationRunner::new(pump.clone());
        let result = runner.run_timed(Duration::from_secs(60), "schedule:s1").await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_secs(120)).await;
        // No OFF was ever scheduled.
        assert_eq!(pump.calls(), vec![PumpState::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn off_is_retried_exactly_once() {
        let pump = MockPump::flaky_off();
        let runner = IrrigationRunner::new(pump.clone());
        runner
            .run_timed(Duration::from_secs(60), "schedule:s1")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(60 + 6)).await;
        assert_eq!(
            pump.calls(),
            vec![PumpState::On, PumpState::Off, PumpState::Off]
        );

        // Nothing further fires later.
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(pump.calls().len(), 3);
    }
}
