//! # Irrigo Gateway
//!
//! HTTP API over the engine: pump status/control, timed manual runs,
//! and schedule CRUD (the only writer of the schedule document).

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
