//! In-memory code store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::verification_code::VerificationCode;

use super::traits::CodeStore;

/// Process-local [`CodeStore`] for single-instance deployments and tests
#[derive(Debug, Default)]
pub struct InMemoryCodeStore {
    codes: RwLock<HashMap<String, VerificationCode>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }

    /// Drop every code expired at `now`; returns how many were removed
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired_at(now));
        let removed = before - codes.len();
        if removed > 0 {
            tracing::debug!(removed, event = "expired_codes_purged", "Purged expired verification codes");
        }
        removed
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn save(&self, code: &VerificationCode) -> Result<(), String> {
        self.codes
            .write()
            .await
            .insert(code.recipient.clone(), code.clone());
        Ok(())
    }

    async fn find(&self, recipient: &str) -> Result<Option<VerificationCode>, String> {
        Ok(self.codes.read().await.get(recipient).cloned())
    }

    async fn remove(&self, recipient: &str) -> Result<(), String> {
        self.codes.write().await.remove(recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn code_for(recipient: &str, issued_at: DateTime<Utc>) -> VerificationCode {
        VerificationCode::new(recipient, "654321", issued_at, Duration::minutes(10), 3)
    }

    #[tokio::test]
    async fn test_save_find_remove() {
        let store = InMemoryCodeStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let code = code_for("ref@uni.edu", t0);

        store.save(&code).await.unwrap();
        assert_eq!(store.find("ref@uni.edu").await.unwrap(), Some(code));
        assert_eq!(store.len().await, 1);

        store.remove("ref@uni.edu").await.unwrap();
        assert!(store.find("ref@uni.edu").await.unwrap().is_none());
        assert!(store.is_empty().await);

        // Removing twice is fine
        store.remove("ref@uni.edu").await.unwrap();
    }

    #[tokio::test]
    async fn test_save_replaces_previous_code() {
        let store = InMemoryCodeStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let first = code_for("ref@uni.edu", t0);
        let mut second = code_for("ref@uni.edu", t0 + Duration::minutes(2));
        second.code = "111111".to_string();

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let stored = store.find("ref@uni.edu").await.unwrap().unwrap();
        assert_eq!(stored.code, "111111");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryCodeStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        store.save(&code_for("old@uni.edu", t0)).await.unwrap();
        store
            .save(&code_for("new@uni.edu", t0 + Duration::minutes(5)))
            .await
            .unwrap();

        // old expires at 12:10:00, new at 12:15:00
        assert_eq!(store.purge_expired(t0 + Duration::minutes(10)).await, 0);
        assert_eq!(store.purge_expired(t0 + Duration::seconds(601)).await, 1);
        assert!(store.find("old@uni.edu").await.unwrap().is_none());
        assert!(store.find("new@uni.edu").await.unwrap().is_some());
    }
}
