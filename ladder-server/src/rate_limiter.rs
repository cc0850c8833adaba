use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Token bucket refilled one token per `refill_rate`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    max_tokens: u32,
    refill_rate: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new_with_limits(max_tokens: u32, refill_rate: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        let now = Instant::now();
        let time_passed = now.duration_since(self.last_refill);

        if time_passed >= self.refill_rate {
            let tokens_to_add = (time_passed.as_millis() / self.refill_rate.as_millis().max(1)) as u32;
            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.max_tokens);
            self.last_refill = now;
        }
    }

    pub fn get_remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

/// One bucket per user for match submissions.
pub struct UserRateLimits {
    buckets: DashMap<Uuid, RateLimiter>,
    max_tokens: u32,
    refill_rate: Duration,
}

impl UserRateLimits {
    pub fn new(max_tokens: u32, refill_rate: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_tokens,
            refill_rate,
        }
    }

    pub fn check(&self, user_id: Uuid) -> bool {
        let mut bucket = self
            .buckets
            .entry(user_id)
            .or_insert_with(|| RateLimiter::new_with_limits(self.max_tokens, self.refill_rate));
        let allowed = bucket.check_rate_limit();
        if !allowed {
            tracing::warn!("Rate limit exceeded for user {}", user_id);
        }
        allowed
    }
}
