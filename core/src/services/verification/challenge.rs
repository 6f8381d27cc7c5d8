//! Second-factor challenge: issue, deliver and verify codes per recipient

use chrono::Duration;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;

use intramural_shared::config::VerificationConfig;

use crate::domain::entities::verification_code::VerificationCode;
use crate::errors::{DomainError, DomainResult, VerificationError};

use super::clock::Clock;
use super::code_service::VerificationCodeService;
use super::random::RandomSource;
use super::recipient::{is_valid_email, mask_email, normalize_email};
use super::traits::{CodeDelivery, CodeStore};
use super::types::{SendCodeResult, VerifyCodeResult};

/// Number of lock stripes guarding per-recipient read-modify-write sections
const RECIPIENT_LOCK_STRIPES: usize = 64;

/// Challenge service wiring code generation to a store and a transport
pub struct ChallengeService<R, C, S, D>
where
    R: RandomSource,
    C: Clock,
    S: CodeStore,
    D: CodeDelivery,
{
    /// Code generation and expiration rules
    codes: VerificationCodeService<R, C>,
    /// Pending codes by recipient
    store: Arc<S>,
    /// Email transport
    delivery: Arc<D>,
    /// Lifecycle settings
    config: VerificationConfig,
    /// Serialises send/verify for the same recipient
    recipient_locks: Vec<Mutex<()>>,
}

impl<R, C, S, D> ChallengeService<R, C, S, D>
where
    R: RandomSource,
    C: Clock,
    S: CodeStore,
    D: CodeDelivery,
{
    /// Create a challenge service.
    ///
    /// Fails with [`DomainError::InvalidArgument`] if `config` does not
    /// validate.
    pub fn new(
        random: R,
        clock: C,
        store: Arc<S>,
        delivery: Arc<D>,
        config: VerificationConfig,
    ) -> DomainResult<Self> {
        let codes = VerificationCodeService::with_config(random, clock, &config)?;
        Ok(Self {
            codes,
            store,
            delivery,
            config,
            recipient_locks: (0..RECIPIENT_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        })
    }

    /// The underlying code service
    pub fn codes(&self) -> &VerificationCodeService<R, C> {
        &self.codes
    }

    /// Issue a code for `recipient` and deliver it.
    ///
    /// 1. Validates and normalises the address
    /// 2. Refuses while a live code is inside its resend cooldown
    /// 3. Replaces any previous code, so only the newest one is accepted
    /// 4. Stores the code, then delivers it
    ///
    /// Concurrent calls for the same recipient are serialised, so only one
    /// of them gets past the cooldown. If delivery fails the stored code is
    /// dropped again (unless something newer replaced it) so the user can
    /// retry immediately.
    pub async fn send_code(&self, recipient: &str) -> DomainResult<SendCodeResult> {
        let recipient = normalize_email(recipient);
        if !is_valid_email(&recipient) {
            return Err(DomainError::InvalidArgument {
                message: format!("Invalid email address: {}", recipient),
            });
        }
        let masked = mask_email(&recipient);
        let cooldown = Duration::seconds(self.config.resend_cooldown_seconds);

        let _guard = self.recipient_lock(&recipient).lock().await;
        let now = self.codes.now();

        if let Some(existing) = self.find(&recipient).await? {
            let elapsed = now - existing.issued_at;
            if existing.is_valid_at(now) && elapsed < cooldown {
                let wait = (cooldown - elapsed).num_seconds().max(1);
                tracing::warn!(
                    recipient = %masked,
                    wait_seconds = wait,
                    event = "resend_cooldown",
                    "Verification code requested during cooldown"
                );
                return Err(VerificationError::ResendCooldown { seconds: wait }.into());
            }
        }

        let verification_code = self.codes.issue(&recipient)?;

        self.store.save(&verification_code).await.map_err(|e| {
            tracing::error!(
                recipient = %masked,
                error = %e,
                event = "code_storage_failed",
                "Failed to store verification code"
            );
            DomainError::Storage {
                message: format!("Failed to store verification code: {}", e),
            }
        })?;

        let message_id = match self
            .delivery
            .deliver(&recipient, &verification_code.code, verification_code.expires_at)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    recipient = %masked,
                    error = %e,
                    event = "code_delivery_failed",
                    "Failed to deliver verification code"
                );
                if let Err(cleanup) = self.remove_if_current(&verification_code).await {
                    tracing::warn!(recipient = %masked, error = %cleanup, "Failed to drop undelivered code");
                }
                return Err(DomainError::Delivery {
                    message: format!("Failed to deliver verification code: {}", e),
                });
            }
        };

        tracing::info!(
            recipient = %masked,
            session_id = %verification_code.id,
            expires_at = %verification_code.expires_at,
            event = "code_issued",
            "Issued verification code"
        );

        Ok(SendCodeResult {
            next_resend_at: verification_code.issued_at + cooldown,
            verification_code,
            message_id,
        })
    }

    /// Check a submitted code against the pending one.
    ///
    /// Refusals (wrong, expired, used, exhausted, malformed, missing) come
    /// back as an unsuccessful [`VerifyCodeResult`]; only store failures are
    /// errors. Once a code is accepted, expired or out of attempts it is
    /// removed from the store. Attempts on the same recipient are
    /// serialised, so concurrent guesses cannot outrun the attempt limit.
    pub async fn verify_code(&self, recipient: &str, input: &str) -> DomainResult<VerifyCodeResult> {
        let recipient = normalize_email(recipient);
        let masked = mask_email(&recipient);
        let _guard = self.recipient_lock(&recipient).lock().await;

        let Some(mut pending) = self.find(&recipient).await? else {
            tracing::warn!(recipient = %masked, event = "code_not_found", "No pending verification code");
            return Ok(VerifyCodeResult::failure(VerificationError::NotFound, None));
        };

        let now = self.codes.now();
        match pending.verify(input, now) {
            Ok(()) => {
                self.remove(&recipient).await?;
                tracing::info!(
                    recipient = %masked,
                    session_id = %pending.id,
                    event = "code_verified",
                    "Verification code accepted"
                );
                Ok(VerifyCodeResult::success())
            }
            Err(VerificationError::InvalidFormat) => {
                tracing::warn!(recipient = %masked, event = "invalid_code_format", "Malformed verification code submitted");
                Ok(VerifyCodeResult::failure(
                    VerificationError::InvalidFormat,
                    Some(pending.remaining_attempts()),
                ))
            }
            Err(VerificationError::InvalidCode { remaining }) => {
                if remaining == 0 {
                    self.remove(&recipient).await?;
                    tracing::warn!(
                        recipient = %masked,
                        session_id = %pending.id,
                        event = "max_attempts_exceeded",
                        "Verification attempts exhausted"
                    );
                } else {
                    self.save(&pending).await?;
                    tracing::warn!(
                        recipient = %masked,
                        remaining_attempts = remaining,
                        event = "code_verification_failed",
                        "Wrong verification code submitted"
                    );
                }
                Ok(VerifyCodeResult::failure(
                    VerificationError::InvalidCode { remaining },
                    Some(remaining),
                ))
            }
            Err(other) => {
                // Expired, used or exhausted: the code is dead either way
                self.remove(&recipient).await?;
                tracing::warn!(
                    recipient = %masked,
                    session_id = %pending.id,
                    reason = %other,
                    event = "code_rejected",
                    "Verification code rejected"
                );
                Ok(VerifyCodeResult::failure(other, None))
            }
        }
    }

    /// Drop any pending code for `recipient`
    pub async fn clear(&self, recipient: &str) -> DomainResult<()> {
        let recipient = normalize_email(recipient);
        tracing::info!(
            recipient = %mask_email(&recipient),
            event = "clear_verification",
            "Clearing pending verification code"
        );
        let _guard = self.recipient_lock(&recipient).lock().await;
        self.remove(&recipient).await
    }

    fn recipient_lock(&self, recipient: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        recipient.hash(&mut hasher);
        let stripe = (hasher.finish() % self.recipient_locks.len() as u64) as usize;
        &self.recipient_locks[stripe]
    }

    /// Remove `code` from the store only if it is still the pending one
    async fn remove_if_current(&self, code: &VerificationCode) -> DomainResult<bool> {
        match self.find(&code.recipient).await? {
            Some(stored) if stored.id == code.id => {
                self.remove(&code.recipient).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find(&self, recipient: &str) -> DomainResult<Option<VerificationCode>> {
        self.store.find(recipient).await.map_err(|e| DomainError::Storage {
            message: format!("Failed to load verification code: {}", e),
        })
    }

    async fn save(&self, code: &VerificationCode) -> DomainResult<()> {
        self.store.save(code).await.map_err(|e| DomainError::Storage {
            message: format!("Failed to update verification code: {}", e),
        })
    }

    async fn remove(&self, recipient: &str) -> DomainResult<()> {
        self.store.remove(recipient).await.map_err(|e| DomainError::Storage {
            message: format!("Failed to remove verification code: {}", e),
        })
    }
}
