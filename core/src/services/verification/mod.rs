//! Verification code service module
//!
//! This module provides the verification code lifecycle:
//! - Six-digit code generation from an injectable random source
//! - Expiration windowing against an injectable clock
//! - Per-recipient challenges with attempt tracking, resend cooldown and
//!   constant-time comparison, on top of pluggable storage and delivery

mod challenge;
mod clock;
mod code_service;
mod random;
mod recipient;
mod store;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use crate::domain::entities::verification_code::{compute_expiration, is_expired};
pub use challenge::ChallengeService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use code_service::{generate_code, parse_instant, VerificationCodeService};
pub use random::{OsRandomSource, RandomSource, SeededRandomSource};
pub use recipient::{is_valid_email, mask_email, normalize_email};
pub use store::InMemoryCodeStore;
pub use traits::{CodeDelivery, CodeStore};
pub use types::{SendCodeResult, VerifyCodeResult};
