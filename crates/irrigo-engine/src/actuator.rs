//! Pump actuator seam — the engine talks to the pump through this
//! trait so tests can swap in a recording fake.

use async_trait::async_trait;
use irrigo_core::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desired pump state, serialized as `"on"` / `"off"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    On,
    Off,
}

impl std::fmt::Display for PumpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PumpState::On => write!(f, "on"),
            PumpState::Off => write!(f, "off"),
        }
    }
}

/// Pump controller status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpStatus {
    /// `idle`, `on` or `off` as reported by the firmware.
    pub state: String,
}

/// The external pump control endpoint.
///
/// The firmware's interface is strictly stateless on/off: the duration
/// hint rides along on the wire for observability, but nothing on the
/// device enforces it. Deactivation is owned by the caller
/// (IrrigationRunner schedules the off command itself).
#[async_trait]
pub trait PumpActuator: Send + Sync {
    /// Switch the pump on or off. `duration_hint` accompanies "on"
    /// commands so the device can display/log the intended run length.
    async fn set_state(&self, state: PumpState, duration_hint: Option<Duration>) -> Result<()>;

    /// Current pump state as reported by the device.
    async fn status(&self) -> Result<PumpStatus>;
}
