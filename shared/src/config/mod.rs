//! Configuration module
//!
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Verification code lifecycle settings

pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::VerificationConfig;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Verification code settings
    #[serde(default)]
    pub verification: VerificationConfig,
}

impl AppConfig {
    /// Configuration for an environment using built-in defaults
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            logging: LoggingConfig::for_environment(environment),
            verification: VerificationConfig::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// The environment-specific .env file is read first, then a plain
    /// `.env`; variables already set in the process are never overridden.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        dotenvy::dotenv().ok();

        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        let config = Self {
            environment,
            logging,
            verification: VerificationConfig::from_env(),
        };
        config.verification.validate()?;
        Ok(config)
    }
}
