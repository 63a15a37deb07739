//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use irrigo_core::error::IrrigoError;
use irrigo_engine::actuator::PumpState;
use irrigo_engine::runner::validate_manual_duration;
use irrigo_engine::schedule::{Schedule, ScheduleDraft, SchedulePatch};
use serde::Deserialize;

use super::server::AppState;

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn ok(data: serde_json::Value) -> ApiResponse {
    (StatusCode::OK, Json(serde_json::json!({"ok": true, "data": data})))
}

fn fail(status: StatusCode, error: impl std::fmt::Display) -> ApiResponse {
    (
        status,
        Json(serde_json::json!({"ok": false, "error": error.to_string()})),
    )
}

/// Map engine errors onto HTTP statuses: bad input → 400, unknown id →
/// 404, pump unreachable → 502, anything else → 500.
fn from_error(e: IrrigoError) -> ApiResponse {
    let status = match &e {
        IrrigoError::Validation(_) => StatusCode::BAD_REQUEST,
        IrrigoError::NotFound(_) => StatusCode::NOT_FOUND,
        IrrigoError::Actuator(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    fail(status, e)
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "service": "irrigo",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Local::now().to_rfc3339(),
    }))
}

/// Current effective configuration (pump endpoint only).
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "pumpUrl": state.config.pump.base_url,
        "checkIntervalSecs": state.config.scheduler.check_interval_secs,
    }))
}

/// Proxy the pump controller's status report.
pub async fn pump_status(State(state): State<Arc<AppState>>) -> ApiResponse {
    match state.pump.status().await {
        Ok(status) => ok(serde_json::json!({"state": status.state})),
        Err(e) => from_error(e),
    }
}

#[derive(Deserialize)]
pub struct PumpBody {
    pub state: Option<String>,
}

/// Direct pump on/off, no timing involved.
pub async fn pump_set(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PumpBody>,
) -> ApiResponse {
    let desired = match body.state.as_deref() {
        Some("on") => PumpState::On,
        Some("off") => PumpState::Off,
        _ => {
            return fail(
                StatusCode::BAD_REQUEST,
                "Invalid body. Expected: { state: 'on' | 'off' }",
            );
        }
    };
    match state.pump.set_state(desired, None).await {
        Ok(()) => ok(serde_json::json!({"state": desired.to_string()})),
        Err(e) => from_error(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedBody {
    pub duration_seconds: Option<u64>,
}

/// Manual timed run — bypasses matching and dedup entirely and calls
/// the runner directly. Failure is surfaced synchronously here, unlike
/// scheduled runs where it only reaches the logs.
pub async fn pump_timed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TimedBody>,
) -> ApiResponse {
    let duration = match validate_manual_duration(body.duration_seconds.unwrap_or(0)) {
        Ok(d) => d,
        Err(e) => return from_error(e),
    };
    match state.runner.run_timed(duration, "timed-manual").await {
        Ok(()) => ok(serde_json::json!({
            "message": format!("Pump on for {}s", duration.as_secs()),
        })),
        Err(e) => from_error(e),
    }
}

/// List all stored schedules.
pub async fn list_schedules(State(state): State<Arc<AppState>>) -> ApiResponse {
    let store = state.store.lock().await;
    let schedules = store.load();
    match serde_json::to_value(&schedules) {
        Ok(data) => ok(data),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Create a schedule. Validation failures never reach the engine.
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ScheduleDraft>,
) -> ApiResponse {
    let schedule = match Schedule::create(draft) {
        Ok(s) => s,
        Err(e) => return from_error(e),
    };
    let store = state.store.lock().await;
    match store.add(schedule) {
        Ok(created) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"ok": true, "data": created})),
        ),
        Err(e) => from_error(e),
    }
}

/// Patch a schedule by id.
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<SchedulePatch>,
) -> ApiResponse {
    let store = state.store.lock().await;
    match store.update(&id, patch) {
        Ok(updated) => match serde_json::to_value(&updated) {
            Ok(data) => ok(data),
            Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e),
        },
        Err(e) => from_error(e),
    }
}

/// Delete a schedule by id.
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResponse {
    let store = state.store.lock().await;
    match store.remove(&id) {
        Ok(()) => ok(serde_json::json!({})),
        Err(e) => from_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use irrigo_core::config::IrrigoConfig;
    use irrigo_core::error::Result;
    use irrigo_engine::actuator::{PumpActuator, PumpStatus};
    use irrigo_engine::runner::IrrigationRunner;
    use irrigo_engine::store::ScheduleStore;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakePump {
        calls: Mutex<Vec<PumpState>>,
        fail: bool,
    }

    #[async_trait]
    impl PumpActuator for FakePump {
        async fn set_state(&self, state: PumpState, _hint: Option<Duration>) -> Result<()> {
            self.calls.lock().unwrap().push(state);
            if self.fail {
                return Err(IrrigoError::Actuator("pump unreachable".into()));
            }
            Ok(())
        }

        async fn status(&self) -> Result<PumpStatus> {
            if self.fail {
                return Err(IrrigoError::Actuator("pump unreachable".into()));
            }
            Ok(PumpStatus { state: "idle".into() })
        }
    }

    fn test_state(name: &str, fail: bool) -> (State<Arc<AppState>>, Arc<FakePump>) {
        let dir = std::env::temp_dir().join(format!("irrigo-test-routes-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        let pump = Arc::new(FakePump {
            calls: Mutex::new(Vec::new()),
            fail,
        });
        let state = AppState {
            config: IrrigoConfig::default(),
            pump: pump.clone(),
            runner: IrrigationRunner::new(pump.clone()),
            store: Arc::new(tokio::sync::Mutex::new(ScheduleStore::new(&dir))),
        };
        (State(Arc::new(state)), pump)
    }

    fn draft_json(time: &str) -> Json<ScheduleDraft> {
        Json(
            serde_json::from_value(serde_json::json!({
                "days": [1, 3],
                "time": time,
                "durationMinutes": 10,
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn health_reports_service() {
        let json = health().await.0;
        assert_eq!(json["ok"], true);
        assert_eq!(json["service"], "irrigo");
    }

    #[tokio::test]
    async fn timed_run_rejects_out_of_bounds() {
        let (state, pump) = test_state("timed-bounds", false);
        for bad in [Some(0u64), Some(7201), None] {
            let (status, _) = pump_timed(
                state.clone(),
                Json(TimedBody {
                    duration_seconds: bad,
                }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        // Rejected before any pump traffic.
        assert!(pump.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timed_run_turns_pump_on() {
        let (state, pump) = test_state("timed-ok", false);
        let (status, body) = pump_timed(
            state,
            Json(TimedBody {
                duration_seconds: Some(90),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["ok"], true);
        assert_eq!(pump.calls.lock().unwrap().as_slice(), &[PumpState::On]);
    }

    #[tokio::test]
    async fn timed_run_surfaces_pump_failure() {
        let (state, _) = test_state("timed-fail", true);
        let (status, body) = pump_timed(
            state,
            Json(TimedBody {
                duration_seconds: Some(60),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.0["ok"], false);
    }

    #[tokio::test]
    async fn pump_set_validates_state() {
        let (state, pump) = test_state("pump-state", false);
        let (status, _) = pump_set(
            state.clone(),
            Json(PumpBody {
                state: Some("open".into()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(pump.calls.lock().unwrap().is_empty());

        let (status, _) = pump_set(
            state,
            Json(PumpBody {
                state: Some("off".into()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pump.calls.lock().unwrap().as_slice(), &[PumpState::Off]);
    }

    #[tokio::test]
    async fn schedule_crud_round_trip() {
        let (state, _) = test_state("crud", false);

        let (status, body) = create_schedule(state.clone(), draft_json("06:30")).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body.0["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = list_schedules(state.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["data"].as_array().unwrap().len(), 1);

        let patch: SchedulePatch =
            serde_json::from_value(serde_json::json!({"enabled": false})).unwrap();
        let (status, body) =
            update_schedule(state.clone(), Path(id.clone()), Json(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["data"]["enabled"], false);

        let (status, _) = delete_schedule(state.clone(), Path(id)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = list_schedules(state).await;
        assert!(body.0["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_time() {
        let (state, _) = test_state("crud-invalid", false);
        let (status, body) = create_schedule(state, draft_json("25:99")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["ok"], false);
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let (state, _) = test_state("crud-404", false);
        let (status, _) =
            update_schedule(state, Path("missing".into()), Json(SchedulePatch::default())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_proxies_pump_failure_as_502() {
        let (state, _) = test_state("status-fail", true);
        let (status, _) = pump_status(state).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
