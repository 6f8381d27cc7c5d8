//! Verification code configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Minutes a freshly issued verification code stays valid
pub const DEFAULT_CODE_EXPIRATION_MINUTES: i64 = 10;

/// Wrong submissions tolerated before a code is burned
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Minimum seconds between two codes sent to the same recipient
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Verification code lifecycle settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Minutes between issuance and expiration
    #[serde(default = "default_code_expiration_minutes")]
    pub code_expiration_minutes: i64,

    /// Maximum number of verification attempts per code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum seconds between resend requests
    #[serde(default = "default_resend_cooldown_seconds")]
    pub resend_cooldown_seconds: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_expiration_minutes: DEFAULT_CODE_EXPIRATION_MINUTES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
        }
    }
}

impl VerificationConfig {
    /// Load from environment variables. Missing or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        Self {
            code_expiration_minutes: env_or("VERIFICATION_CODE_TTL_MINUTES", DEFAULT_CODE_EXPIRATION_MINUTES),
            max_attempts: env_or("VERIFICATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            resend_cooldown_seconds: env_or(
                "VERIFICATION_RESEND_COOLDOWN_SECONDS",
                DEFAULT_RESEND_COOLDOWN_SECONDS,
            ),
        }
    }

    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.code_expiration_minutes = minutes;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_resend_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    /// Reject settings that would make every code dead on arrival
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_expiration_minutes <= 0 {
            return Err(ConfigError::Invalid {
                field: "code_expiration_minutes".into(),
                reason: "must be positive".into(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.resend_cooldown_seconds < 0 {
            return Err(ConfigError::Invalid {
                field: "resend_cooldown_seconds".into(),
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn default_code_expiration_minutes() -> i64 {
    DEFAULT_CODE_EXPIRATION_MINUTES
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_resend_cooldown_seconds() -> i64 {
    DEFAULT_RESEND_COOLDOWN_SECONDS
}
