//! Client-side send throttling: a fixed window counter plus a minimum gap between sends.

use chat_core::RateLimitConfig;

/// Counters are process-local and reset on restart. Times are epoch milliseconds.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    last_message_time: i64,
    message_count: u32,
    reset_time: i64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_message_time: 0,
            message_count: 0,
            reset_time: 0,
        }
    }

    /// Checks without counting. Rolls the window over when `now` is past its end.
    pub fn is_limited_at(&mut self, now: i64) -> bool {
        if now > self.reset_time {
            self.message_count = 0;
            self.reset_time = now + self.config.window.as_millis() as i64;
        }
        if self.message_count >= self.config.max_per_window {
            return true;
        }
        now - self.last_message_time < self.config.min_interval.as_millis() as i64
    }

    /// Counts an accepted send.
    pub fn record_at(&mut self, now: i64) {
        self.last_message_time = now;
        self.message_count += 1;
    }

    /// Check and, when not limited, count; returns whether the send may proceed.
    pub fn try_acquire_at(&mut self, now: i64) -> bool {
        if self.is_limited_at(now) {
            return false;
        }
        self.record_at(now);
        true
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
