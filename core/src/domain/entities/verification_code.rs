//! Verification code entity for email-based second-factor checks.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use intramural_shared::config::verification::{
    DEFAULT_CODE_EXPIRATION_MINUTES, DEFAULT_MAX_ATTEMPTS,
};

use crate::errors::VerificationError;

/// Maximum number of verification attempts allowed
pub const MAX_ATTEMPTS: u32 = DEFAULT_MAX_ATTEMPTS;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Smallest code that can be issued
pub const CODE_MIN: u32 = 100_000;

/// Largest code that can be issued
pub const CODE_MAX: u32 = 999_999;

/// Default expiration time for verification codes (10 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = DEFAULT_CODE_EXPIRATION_MINUTES;

/// Expiration instant for a code issued at `now` with the default lifetime.
///
/// Plain UTC duration arithmetic, so day, month and year rollovers are exact
/// and no daylight-saving shift can creep in.
pub fn compute_expiration(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(DEFAULT_EXPIRATION_MINUTES)
}

/// `true` once `now` is strictly later than `expires_at`.
///
/// The boundary instant itself is still valid.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

/// Six ASCII digits, nothing else
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Verification code entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier, used to correlate log events
    pub id: Uuid,

    /// Email address the code was sent to (normalised)
    pub recipient: String,

    /// The 6-digit verification code
    pub code: String,

    /// Number of verification attempts made
    pub attempts: u32,

    /// Attempts allowed before the code is burned
    pub max_attempts: u32,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been successfully used
    pub is_used: bool,
}

impl VerificationCode {
    /// Creates a code issued at `issued_at` that lives for `ttl`.
    ///
    /// The code value itself comes from the caller; see
    /// [`crate::services::verification::generate_code`].
    pub fn new(
        recipient: impl Into<String>,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            code: code.into(),
            attempts: 0,
            max_attempts,
            issued_at,
            expires_at: issued_at + ttl,
            is_used: false,
        }
    }

    /// Checks if the code has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }

    /// A code is valid if it hasn't expired, hasn't been used and still has
    /// attempts left.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_used && self.attempts < self.max_attempts
    }

    /// Verifies a submitted code at `now`.
    ///
    /// Malformed input is rejected without consuming an attempt. A wrong
    /// but well-formed code consumes one; a match marks the code used.
    /// The comparison runs in constant time.
    pub fn verify(&mut self, input_code: &str, now: DateTime<Utc>) -> Result<(), VerificationError> {
        if self.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        if self.is_used {
            return Err(VerificationError::AlreadyUsed);
        }

        if self.attempts >= self.max_attempts {
            return Err(VerificationError::MaxAttemptsExceeded);
        }

        if !is_well_formed(input_code) {
            return Err(VerificationError::InvalidFormat);
        }

        self.attempts += 1;

        if constant_time_eq(self.code.as_bytes(), input_code.as_bytes()) {
            self.is_used = true;
            Ok(())
        } else {
            Err(VerificationError::InvalidCode {
                remaining: self.remaining_attempts(),
            })
        }
    }

    /// Remaining verification attempts (0 if exhausted)
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    /// Time left until expiration, or zero once expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }

    pub fn mark_as_used(&mut self) {
        self.is_used = true;
    }
}
