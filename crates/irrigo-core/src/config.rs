//! Irrigo configuration system.
//!
//! TOML file at `~/.irrigo/config.toml`, overridable via the
//! `IRRIGO_CONFIG` env var. Every field carries a serde default so a
//! partial (or missing) file still yields a runnable config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IrrigoError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IrrigoConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub pump: PumpConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// ESP32 pump controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpConfig {
    /// Base URL of the pump controller, e.g. `http://192.168.1.50`.
    /// `IRRIGO_PUMP_URL` env var takes precedence.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Trigger loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Evaluation cadence in seconds. Must stay ≤60 or exact-minute
    /// matching can skip an eligible minute entirely.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Directory holding schedules.json. Empty = `~/.irrigo`.
    #[serde(default)]
    pub data_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_check_interval() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            data_dir: String::new(),
        }
    }
}

impl IrrigoConfig {
    /// Load config from the default path (or `IRRIGO_CONFIG`).
    pub fn load() -> Result<Self> {
        let path = std::env::var("IRRIGO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            let mut config = Self::default();
            config.apply_env();
            Ok(config)
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IrrigoError::Config(format!("Failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| IrrigoError::Config(format!("Failed to parse config: {e}")))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply env var overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("IRRIGO_PUMP_URL")
            && !url.trim().is_empty()
        {
            self.pump.base_url = url.trim().to_string();
        }
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| IrrigoError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Irrigo home directory (~/.irrigo).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".irrigo")
    }

    /// Resolved data directory for the schedule document.
    pub fn data_dir(&self) -> PathBuf {
        if self.scheduler.data_dir.is_empty() {
            Self::home_dir()
        } else {
            PathBuf::from(&self.scheduler.data_dir)
        }
    }
}
