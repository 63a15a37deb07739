//! # Irrigo Pump
//!
//! HTTP client for the ESP32 pump controller. The device exposes two
//! endpoints: `GET /status` and `POST /pump {"state":"on"|"off"}`.
//! The firmware never turns the pump off on its own — deactivation is
//! owned by the engine's irrigation runner.

pub mod client;

pub use client::EspPumpClient;
