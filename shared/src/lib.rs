//! Shared configuration and telemetry for the intramural platform server
//!
//! - Configuration types (environment, logging, verification codes)
//! - Tracing subscriber initialisation

pub mod config;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, Environment, LogFormat, LoggingConfig, VerificationConfig};
pub use telemetry::init_tracing;
