//! # Irrigo — irrigation controller
//!
//! Weekday/time schedules drive an ESP32 pump over HTTP. One process:
//! the trigger loop evaluates schedules every 30s, the gateway serves
//! the JSON API for manual runs and schedule CRUD.
//!
//! Usage:
//!   irrigo                               # defaults + ~/.irrigo/config.toml
//!   irrigo --pump-url http://10.0.0.7    # override pump endpoint
//!   irrigo --port 8080 --verbose

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use irrigo_core::config::IrrigoConfig;
use irrigo_engine::clock::SystemClock;
use irrigo_engine::engine::{TriggerEngine, spawn_trigger_loop};
use irrigo_engine::runner::IrrigationRunner;
use irrigo_engine::store::ScheduleStore;
use irrigo_gateway::AppState;
use irrigo_pump::EspPumpClient;

#[derive(Parser)]
#[command(name = "irrigo", version, about = "💧 Irrigo — irrigation schedule controller")]
struct Cli {
    /// Config file path (default: ~/.irrigo/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Gateway bind host
    #[arg(long)]
    host: Option<String>,

    /// Gateway port
    #[arg(short, long)]
    port: Option<u16>,

    /// Pump controller base URL (overrides config and IRRIGO_PUMP_URL)
    #[arg(long)]
    pump_url: Option<String>,

    /// Trigger loop cadence in seconds (keep ≤60)
    #[arg(long)]
    check_interval: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => IrrigoConfig::load_from(std::path::Path::new(path))?,
        None => IrrigoConfig::load()?,
    };
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(url) = cli.pump_url {
        config.pump.base_url = url;
    }
    if let Some(secs) = cli.check_interval {
        config.scheduler.check_interval_secs = secs;
    }

    let pump = Arc::new(EspPumpClient::new(
        &config.pump.base_url,
        Duration::from_secs(config.pump.request_timeout_secs),
    )?);
    tracing::info!("🚰 Pump controller: {}", pump.base_url());

    let runner = IrrigationRunner::new(pump.clone());
    let data_dir = config.data_dir();

    // The trigger loop owns its own store handle and re-reads the
    // document every pass; the gateway's handle is the only writer.
    let engine = TriggerEngine::new(ScheduleStore::new(&data_dir), Arc::new(SystemClock));
    let engine = Arc::new(tokio::sync::Mutex::new(engine));
    tokio::spawn(spawn_trigger_loop(
        engine,
        runner.clone(),
        config.scheduler.check_interval_secs,
    ));

    let state = AppState {
        config,
        pump,
        runner,
        store: Arc::new(tokio::sync::Mutex::new(ScheduleStore::new(&data_dir))),
    };
    irrigo_gateway::start(state).await
}
