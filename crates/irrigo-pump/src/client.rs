//! ESP32 pump controller client.

use std::time::Duration;

use async_trait::async_trait;
use irrigo_core::error::{IrrigoError, Result};
use irrigo_engine::actuator::{PumpActuator, PumpState, PumpStatus};

/// HTTP client for the pump controller.
#[derive(Debug)]
pub struct EspPumpClient {
    base_url: String,
    client: reqwest::Client,
}

impl EspPumpClient {
    /// `base_url` e.g. `http://192.168.1.50`; trailing slash tolerated.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(IrrigoError::Config(
                "pump base URL is not configured (set pump.base_url or IRRIGO_PUMP_URL)".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| IrrigoError::Actuator(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PumpActuator for EspPumpClient {
    async fn set_state(&self, state: PumpState, duration_hint: Option<Duration>) -> Result<()> {
        let url = format!("{}/pump", self.base_url);
        let mut body = serde_json::json!({ "state": state });
        // The firmware ignores unknown fields; the hint is for logs on
        // the device side only.
        if let Some(hint) = duration_hint {
            body["durationMs"] = serde_json::json!(hint.as_millis() as u64);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IrrigoError::Actuator(format!("Pump request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(IrrigoError::Actuator(format!(
                "Pump controller error {status}: {text}"
            )));
        }

        tracing::debug!("🚰 Pump state set to '{state}'");
        Ok(())
    }

    async fn status(&self) -> Result<PumpStatus> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IrrigoError::Actuator(format!("Status request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IrrigoError::Actuator(format!(
                "Pump controller error {}",
                response.status()
            )));
        }

        response
            .json::<PumpStatus>()
            .await
            .map_err(|e| IrrigoError::Actuator(format!("Invalid status payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let client = EspPumpClient::new("http://10.0.0.7/ ", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.7");
    }

    #[test]
    fn empty_url_is_a_config_error() {
        let err = EspPumpClient::new("  ", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, IrrigoError::Config(_)));
    }

    #[test]
    fn status_payload_parses() {
        let status: PumpStatus = serde_json::from_str(r#"{"state":"on"}"#).unwrap();
        assert_eq!(status.state, "on");
    }
}
