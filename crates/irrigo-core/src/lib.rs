//! # Irrigo Core
//!
//! Shared foundation for the irrigation controller: configuration
//! loading and the error taxonomy used across all crates.

pub mod config;
pub mod error;

pub use config::IrrigoConfig;
pub use error::{IrrigoError, Result};
