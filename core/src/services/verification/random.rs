//! Random source port for code generation

use rand::{rngs::OsRng, rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{DomainError, DomainResult};

/// Source of uniformly distributed integers.
pub trait RandomSource: Send + Sync {
    /// Uniform draw from `low..=high`.
    ///
    /// Fails with [`DomainError::EntropyUnavailable`] when no randomness can
    /// be produced, or [`DomainError::InvalidArgument`] when `low > high`.
    fn next_u32_inclusive(&self, low: u32, high: u32) -> DomainResult<u32>;
}

impl<R: RandomSource + ?Sized> RandomSource for Arc<R> {
    fn next_u32_inclusive(&self, low: u32, high: u32) -> DomainResult<u32> {
        (**self).next_u32_inclusive(low, high)
    }
}

fn check_range(low: u32, high: u32) -> DomainResult<()> {
    if low > high {
        return Err(DomainError::InvalidArgument {
            message: format!("empty range: {}..={}", low, high),
        });
    }
    Ok(())
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn next_u32_inclusive(&self, low: u32, high: u32) -> DomainResult<u32> {
        check_range(low, high)?;

        let span = u64::from(high - low) + 1;
        // Largest multiple of span that fits in u32; draws at or above it are
        // rejected so the modulo stays unbiased.
        let zone = (u64::from(u32::MAX) + 1) / span * span;

        loop {
            let mut bytes = [0u8; 4];
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| DomainError::EntropyUnavailable {
                    message: e.to_string(),
                })?;

            let value = u64::from(u32::from_le_bytes(bytes));
            if value < zone {
                return Ok(low + (value % span) as u32);
            }
        }
    }
}

/// Deterministic source seeded from a fixed value.
///
/// Same seed, same sequence. Not suitable for issuing real codes.
#[derive(Debug)]
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_u32_inclusive(&self, low: u32, high: u32) -> DomainResult<u32> {
        check_range(low, high)?;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.gen_range(low..=high))
    }
}
