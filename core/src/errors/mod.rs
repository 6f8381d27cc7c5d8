//! Domain-specific error types and error handling.

use thiserror::Error;


/// Why a submitted verification code was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Verification code has expired")]
    Expired,

    #[error("Verification code has already been used")]
    AlreadyUsed,

    #[error("Maximum verification attempts exceeded")]
    MaxAttemptsExceeded,

    #[error("Invalid verification code. {remaining} attempt(s) remaining")]
    InvalidCode { remaining: u32 },

    #[error("Invalid verification code format")]
    InvalidFormat,

    #[error("No verification code pending for this recipient")]
    NotFound,

    #[error("Please wait {seconds} seconds before requesting a new code")]
    ResendCooldown { seconds: i64 },
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// The random source could not produce a value. The runtime is broken;
    /// callers must not retry.
    #[error("Entropy unavailable: {message}")]
    EntropyUnavailable { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Delivery error: {message}")]
    Delivery { message: String },

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    /// Whether the error indicates a broken runtime rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::EntropyUnavailable { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
