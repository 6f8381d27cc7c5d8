//! Verification code generation and expiration windowing

use chrono::{DateTime, Duration, Utc};

use intramural_shared::config::VerificationConfig;

use crate::domain::entities::verification_code::{
    self, VerificationCode, CODE_MAX, CODE_MIN, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS,
};
use crate::errors::{DomainError, DomainResult};

use super::clock::Clock;
use super::random::RandomSource;

/// Draws a six-digit code from `random`.
///
/// The value comes from `[100000, 999999]`, so the decimal rendering is
/// always exactly six characters with no padding.
pub fn generate_code<R: RandomSource + ?Sized>(random: &R) -> DomainResult<String> {
    let value = random.next_u32_inclusive(CODE_MIN, CODE_MAX)?;
    if !(CODE_MIN..=CODE_MAX).contains(&value) {
        return Err(DomainError::EntropyUnavailable {
            message: format!("random source returned out-of-range value {}", value),
        });
    }
    Ok(value.to_string())
}

/// Parses a persisted RFC 3339 expiration instant.
pub fn parse_instant(raw: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::InvalidArgument {
            message: format!("invalid instant '{}': {}", raw, e),
        })
}

/// Stateless verification code service.
///
/// Holds only its collaborators: a random source, a clock and the code
/// lifetime. Every method is safe to call from concurrent tasks.
#[derive(Debug, Clone)]
pub struct VerificationCodeService<R: RandomSource, C: Clock> {
    random: R,
    clock: C,
    ttl: Duration,
    max_attempts: u32,
}

impl<R: RandomSource, C: Clock> VerificationCodeService<R, C> {
    /// Service with the default 10 minute lifetime
    pub fn new(random: R, clock: C) -> Self {
        Self {
            random,
            clock,
            ttl: Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Service using the lifetime and attempt limit from `config`.
    ///
    /// The config is validated first; a non-positive lifetime would violate
    /// "expiration is strictly after issuance".
    pub fn with_config(random: R, clock: C, config: &VerificationConfig) -> DomainResult<Self> {
        config.validate().map_err(|e| DomainError::InvalidArgument {
            message: e.to_string(),
        })?;

        Ok(Self {
            random,
            clock,
            ttl: Duration::minutes(config.code_expiration_minutes),
            max_attempts: config.max_attempts,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Generate a fresh six-digit code.
    ///
    /// The only failure is [`DomainError::EntropyUnavailable`], which callers
    /// should treat as fatal.
    pub fn generate_code(&self) -> DomainResult<String> {
        generate_code(&self.random).map_err(|e| {
            tracing::error!(
                error = %e,
                event = "entropy_unavailable",
                "Failed to generate verification code"
            );
            e
        })
    }

    /// Expiration instant for a code issued at `now`
    pub fn compute_expiration(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }

    /// Expiration instant for a code issued right now
    pub fn expiration_from_now(&self) -> DateTime<Utc> {
        self.compute_expiration(self.clock.now())
    }

    /// `true` iff `now` is strictly later than `expires_at`
    pub fn is_expired(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        verification_code::is_expired(expires_at, now)
    }

    /// Expiration check against the injected clock
    pub fn is_expired_now(&self, expires_at: DateTime<Utc>) -> bool {
        self.is_expired(expires_at, self.clock.now())
    }

    /// Expiration check for a value read from storage, where the instant may
    /// be missing. A missing instant is an error, never "expired" or "valid".
    pub fn check_expiration(
        &self,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        match expires_at {
            Some(expires_at) => Ok(self.is_expired(expires_at, now)),
            None => Err(DomainError::InvalidArgument {
                message: "expiration instant is missing".to_string(),
            }),
        }
    }

    /// Issue a new code for `recipient`, stamped with the current instant
    pub fn issue(&self, recipient: &str) -> DomainResult<VerificationCode> {
        let code = self.generate_code()?;
        let issued_at = self.clock.now();
        Ok(VerificationCode::new(
            recipient,
            code,
            issued_at,
            self.ttl,
            self.max_attempts,
        ))
    }
}
