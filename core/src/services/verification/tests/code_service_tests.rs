//! Unit tests for the stateless verification code service

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use intramural_shared::config::VerificationConfig;

use crate::domain::entities::verification_code::{CODE_LENGTH, CODE_MAX, CODE_MIN};
use crate::errors::DomainError;
use crate::services::verification::{
    generate_code, parse_instant, FixedClock, OsRandomSource, RandomSource, SeededRandomSource,
    SystemClock, VerificationCodeService,
};

use super::mocks::{FailingRandom, StubRandom};

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, h, m, s).unwrap()
}

#[test]
fn test_generate_code_format() {
    let service = VerificationCodeService::new(OsRandomSource, SystemClock);

    for _ in 0..1_000 {
        let code = service.generate_code().unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let num: u32 = code.parse().unwrap();
        assert!((CODE_MIN..=CODE_MAX).contains(&num));
    }
}

#[test]
fn test_generate_code_range_edges() {
    let random = StubRandom::new(&[100_000, 999_999]);
    assert_eq!(generate_code(&random).unwrap(), "100000");
    assert_eq!(generate_code(&random).unwrap(), "999999");
}

#[test]
fn test_generate_code_distribution_is_roughly_uniform() {
    let random = SeededRandomSource::new(7);
    let mut buckets = [0u32; 9];

    for _ in 0..100_000 {
        let code = generate_code(&random).unwrap();
        let leading = code.as_bytes()[0] - b'1';
        buckets[leading as usize] += 1;
    }

    // 100_000 / 9 ≈ 11_111 per leading digit; one standard deviation is ~100
    for (digit, count) in buckets.iter().enumerate() {
        assert!(
            (10_500..=11_700).contains(count),
            "leading digit {} drawn {} times",
            digit + 1,
            count
        );
    }
}

#[test]
fn test_os_random_distribution_is_roughly_uniform() {
    let random = OsRandomSource;
    let mut buckets = [0u32; 9];

    for _ in 0..100_000 {
        let code = generate_code(&random).unwrap();
        let leading = code.as_bytes()[0] - b'1';
        buckets[leading as usize] += 1;
    }

    for (digit, count) in buckets.iter().enumerate() {
        assert!(
            (10_500..=11_700).contains(count),
            "leading digit {} drawn {} times",
            digit + 1,
            count
        );
    }
}

#[test]
fn test_os_random_small_span_is_unbiased() {
    let mut buckets = [0u32; 3];

    for _ in 0..30_000 {
        let value = OsRandomSource.next_u32_inclusive(0, 2).unwrap();
        buckets[value as usize] += 1;
    }

    // 10_000 expected per value; one standard deviation is ~82
    for (value, count) in buckets.iter().enumerate() {
        assert!((9_500..=10_500).contains(count), "{} drawn {} times", value, count);
    }
}

#[test]
fn test_generate_code_entropy_unavailable() {
    let service = VerificationCodeService::new(FailingRandom, SystemClock);

    let err = service.generate_code().unwrap_err();
    assert!(matches!(err, DomainError::EntropyUnavailable { .. }));
    assert!(err.is_fatal());
    assert!(service.issue("captain@uni.edu").is_err());
}

#[test]
fn test_generate_code_rejects_out_of_range_source() {
    let random = StubRandom::new(&[99_999]);
    assert!(matches!(
        generate_code(&random),
        Err(DomainError::EntropyUnavailable { .. })
    ));
}

#[test]
fn test_compute_expiration_is_ten_minutes() {
    let service = VerificationCodeService::new(OsRandomSource, SystemClock);

    for now in [
        at(0, 0, 0),
        at(23, 55, 30),
        Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2025, 3, 30, 1, 55, 0).unwrap(),
    ] {
        let expires_at = service.compute_expiration(now);
        assert_eq!(expires_at - now, Duration::minutes(10));
        assert!(expires_at > now);
        assert!(!service.is_expired(expires_at, now));
    }
}

#[test]
fn test_is_expired_boundaries() {
    let service = VerificationCodeService::new(OsRandomSource, SystemClock);
    let expires_at = at(0, 10, 0);

    assert!(!service.is_expired(expires_at, at(0, 10, 0)));
    assert!(service.is_expired(expires_at, at(0, 10, 1)));
    assert!(!service.is_expired(expires_at, at(0, 9, 59)));
}

#[test]
fn test_end_to_end_with_fixed_clock() {
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(t0));
    let service = VerificationCodeService::new(StubRandom::new(&[482_913]), Arc::clone(&clock));

    let code = service.issue("captain@uni.edu").unwrap();
    assert_eq!(code.code, "482913");
    assert_eq!(code.issued_at, t0);
    assert_eq!(code.expires_at, Utc.with_ymd_and_hms(2025, 6, 1, 12, 10, 0).unwrap());
    assert_eq!(service.expiration_from_now(), code.expires_at);

    clock.advance(Duration::minutes(9) + Duration::seconds(59));
    assert!(!service.is_expired_now(code.expires_at));

    clock.set(t0 + Duration::minutes(10) + Duration::seconds(1));
    assert!(service.is_expired_now(code.expires_at));
}

#[test]
fn test_check_expiration_missing_instant() {
    let service = VerificationCodeService::new(OsRandomSource, SystemClock);
    let now = at(0, 10, 0);

    let err = service.check_expiration(None, now).unwrap_err();
    assert!(matches!(err, DomainError::InvalidArgument { .. }));

    assert!(!service.check_expiration(Some(at(0, 10, 0)), now).unwrap());
    assert!(service.check_expiration(Some(at(0, 9, 59)), now).unwrap());
}

#[test]
fn test_parse_instant() {
    assert_eq!(parse_instant("2025-01-01T00:10:00Z").unwrap(), at(0, 10, 0));
    // Offsets are normalised to UTC
    assert_eq!(parse_instant("2024-12-31T19:10:00-05:00").unwrap(), at(0, 10, 0));
    assert!(matches!(
        parse_instant("yesterday"),
        Err(DomainError::InvalidArgument { .. })
    ));
}

#[test]
fn test_with_config() {
    let config = VerificationConfig::default()
        .with_expiration_minutes(15)
        .with_max_attempts(5);
    let service = VerificationCodeService::with_config(OsRandomSource, SystemClock, &config).unwrap();

    assert_eq!(service.ttl(), Duration::minutes(15));
    assert_eq!(service.max_attempts(), 5);
    assert_eq!(service.compute_expiration(at(0, 0, 0)), at(0, 15, 0));

    let bad = VerificationConfig::default().with_expiration_minutes(0);
    assert!(matches!(
        VerificationCodeService::with_config(OsRandomSource, SystemClock, &bad),
        Err(DomainError::InvalidArgument { .. })
    ));
}

#[test]
fn test_concurrent_generation() {
    let service = Arc::new(VerificationCodeService::new(OsRandomSource, SystemClock));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                for _ in 0..200 {
                    let code = service.generate_code().unwrap();
                    assert_eq!(code.len(), CODE_LENGTH);
                }
            });
        }
    });
}
