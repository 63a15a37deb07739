//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use irrigo_core::config::IrrigoConfig;
use irrigo_engine::actuator::PumpActuator;
use irrigo_engine::runner::IrrigationRunner;
use irrigo_engine::store::ScheduleStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: IrrigoConfig,
    /// Pump controller — shared with the trigger loop's runner.
    pub pump: Arc<dyn PumpActuator>,
    /// Timed run entry point, same one the trigger loop uses.
    pub runner: IrrigationRunner,
    /// Schedule document access. All writes go through this mutex;
    /// the trigger loop reads the file independently.
    pub store: Arc<tokio::sync::Mutex<ScheduleStore>>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/config", get(routes::get_config))
        .route("/api/status", get(routes::pump_status))
        .route("/api/pump", post(routes::pump_set))
        .route("/api/pump/timed", post(routes::pump_timed))
        .route("/api/schedules", get(routes::list_schedules))
        .route("/api/schedules", post(routes::create_schedule))
        .route("/api/schedules/{id}", put(routes::update_schedule))
        .route(
            "/api/schedules/{id}",
            axum::routing::delete(routes::delete_schedule),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                ])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server. Runs until process exit.
pub async fn start(state: AppState) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.gateway.host, state.config.gateway.port
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Gateway server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
