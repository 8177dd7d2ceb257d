//! Unit tests for RateLimiter with explicit clock values.

use std::time::Duration;

use chat_core::RateLimitConfig;

use crate::rate_limiter::RateLimiter;

const T0: i64 = 1_700_000_000_000;

#[test]
fn test_first_send_is_allowed() {
    let mut limiter = RateLimiter::default();
    assert!(limiter.try_acquire_at(T0));
    assert_eq!(limiter.message_count(), 1);
}

#[test]
fn test_sends_closer_than_min_interval_are_limited() {
    let mut limiter = RateLimiter::default();
    assert!(limiter.try_acquire_at(T0));
    assert!(!limiter.try_acquire_at(T0 + 1999));
    assert!(limiter.try_acquire_at(T0 + 2000));
}

#[test]
fn test_rejected_checks_do_not_count() {
    let mut limiter = RateLimiter::default();
    assert!(limiter.try_acquire_at(T0));
    for offset in [10, 500, 1500] {
        assert!(!limiter.try_acquire_at(T0 + offset));
    }
    assert_eq!(limiter.message_count(), 1);
}

#[test]
fn test_eleventh_send_in_window_is_limited() {
    let mut limiter = RateLimiter::default();
    for i in 0..10 {
        assert!(limiter.try_acquire_at(T0 + i * 2000), "send {} rejected", i);
    }
    // Still inside the 60 s window that opened at T0, and well past the minimum gap.
    assert!(limiter.is_limited_at(T0 + 25_000));
    assert!(!limiter.try_acquire_at(T0 + 59_000));
}

#[test]
fn test_window_resets_after_a_minute() {
    let mut limiter = RateLimiter::default();
    for i in 0..10 {
        assert!(limiter.try_acquire_at(T0 + i * 2000));
    }
    assert!(!limiter.try_acquire_at(T0 + 60_000));
    assert!(limiter.try_acquire_at(T0 + 60_001));
    assert_eq!(limiter.message_count(), 1);
}

#[test]
fn test_custom_config() {
    let mut limiter = RateLimiter::new(RateLimitConfig {
        max_per_window: 2,
        window: Duration::from_secs(10),
        min_interval: Duration::ZERO,
    });
    assert!(limiter.try_acquire_at(T0));
    assert!(limiter.try_acquire_at(T0));
    assert!(!limiter.try_acquire_at(T0 + 1));
    assert!(limiter.try_acquire_at(T0 + 10_001));
}
