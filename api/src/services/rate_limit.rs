//! Per-user rate limiting for LLM-backed endpoints
//!
//! Uses a simple token bucket algorithm with in-memory storage.
//! Tokens are stored per user id and refill over time.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Rate limiter configuration
pub struct RateLimitConfig {
    /// Maximum tokens (burst capacity)
    pub max_tokens: u32,
    /// Tokens added per second
    pub refill_rate: f64,
}

struct UserBucket {
    tokens: f64,
    last_update: Instant,
}

/// Per-user rate limiter using token bucket algorithm
pub struct UserRateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<Uuid, UserBucket>>,
}

impl UserRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Check if a request is allowed for the given user.
    /// Returns true if allowed, false if rate limited.
    pub fn check(&self, user_id: Uuid) -> bool {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: Uuid, now: Instant) -> bool {
        // A poisoned lock only means another request panicked mid-update;
        // the bucket map itself is still usable.
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        let bucket = buckets.entry(user_id).or_insert_with(|| UserBucket {
            tokens: self.config.max_tokens as f64,
            last_update: now,
        });

        // Refill tokens based on time elapsed
        let elapsed = now.saturating_duration_since(bucket.last_update);
        let refill = elapsed.as_secs_f64() * self.config.refill_rate;
        bucket.tokens = (bucket.tokens + refill).min(self.config.max_tokens as f64);
        bucket.last_update = now;

        // Try to consume a token
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets of users idle for longer than `max_age`
    pub fn cleanup(&self, max_age: Duration) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < max_age);
    }
}

/// Global rate limiter for AI generation endpoints
/// - Burst of 10 generations
/// - Sustained rate of one every 20 seconds (3/min)
pub static AI_RATE_LIMITER: LazyLock<UserRateLimiter> = LazyLock::new(|| {
    UserRateLimiter::new(RateLimitConfig {
        max_tokens: 10,
        refill_rate: 0.05,
    })
});

/// Periodically evict idle buckets so the map does not grow without bound
pub async fn run_cleanup(limiter: &'static UserRateLimiter, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        limiter.cleanup(every);
    }
}
