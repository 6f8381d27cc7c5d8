//! Types for challenge service results

use chrono::{DateTime, Utc};

use crate::domain::entities::verification_code::VerificationCode;
use crate::errors::VerificationError;

/// Result of sending a verification code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    /// The verification code entity that was created
    pub verification_code: VerificationCode,
    /// Message id reported by the delivery transport
    pub message_id: String,
    /// When the recipient can request another code
    pub next_resend_at: DateTime<Utc>,
}

/// Result of verifying a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCodeResult {
    /// Whether the verification was successful
    pub success: bool,
    /// Attempts left on the pending code, when one is still pending
    pub remaining_attempts: Option<u32>,
    /// Why verification failed
    pub error: Option<VerificationError>,
}

impl VerifyCodeResult {
    pub fn success() -> Self {
        Self {
            success: true,
            remaining_attempts: None,
            error: None,
        }
    }

    pub fn failure(error: VerificationError, remaining_attempts: Option<u32>) -> Self {
        Self {
            success: false,
            remaining_attempts,
            error: Some(error),
        }
    }

    /// Human-readable failure message
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
