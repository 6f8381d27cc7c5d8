//! Traits for code persistence and delivery integration

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::verification_code::VerificationCode;

/// Persistence for pending verification codes, keyed by recipient.
///
/// At most one code is stored per recipient; `save` replaces any previous
/// one.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Insert or replace the code for `code.recipient`
    async fn save(&self, code: &VerificationCode) -> Result<(), String>;
    /// Fetch the pending code for a recipient
    async fn find(&self, recipient: &str) -> Result<Option<VerificationCode>, String>;
    /// Drop the pending code for a recipient (no-op if absent)
    async fn remove(&self, recipient: &str) -> Result<(), String>;
}

/// Transport that hands a code to the user (email in production)
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Send `code` to `recipient`; returns the provider's message id
    async fn deliver(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, String>;
}
