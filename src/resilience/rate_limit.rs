//! Token bucket admission control.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::ClientError;
use crate::observability::metrics;

/// Bucket balance, refilled lazily on each acquisition.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn refill(&mut self, capacity: f64, refill_per_sec: f64) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.last_refill = now;
    }
}

/// Rate limiter allowing `rate` acquisitions per `period`, bursting up to `rate`.
///
/// Shared by every call issued through one connection.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    period: Duration,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    pub fn new(rate: f64, period: Duration) -> Result<Self, ClientError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ClientError::validation(format!(
                "rate limit must be a positive number, got {rate}"
            )));
        }
        if period.is_zero() {
            return Err(ClientError::validation("rate limit period must be non-zero"));
        }

        Ok(Self {
            rate,
            period,
            bucket: Mutex::new(TokenBucket {
                tokens: rate,
                last_refill: Instant::now(),
            }),
        })
    }

    /// `rate` requests per second.
    pub fn per_second(rate: f64) -> Result<Self, ClientError> {
        Self::new(rate, Duration::from_secs(1))
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn refill_per_sec(&self) -> f64 {
        self.rate / self.period.as_secs_f64()
    }

    /// Take `cost` tokens, returning how long the caller must wait first.
    ///
    /// A zero duration means the tokens were available. Otherwise the balance
    /// is zeroed and the returned wait covers the deficit, saturating at
    /// `Duration::MAX`. A non-finite or non-positive cost is free. Never sleeps.
    pub fn acquire(&self, cost: f64) -> Duration {
        if !cost.is_finite() || cost <= 0.0 {
            return Duration::ZERO;
        }

        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(self.rate, self.refill_per_sec());

        if bucket.tokens >= cost {
            bucket.tokens -= cost;
            return Duration::ZERO;
        }

        let deficit = cost - bucket.tokens;
        bucket.tokens = 0.0;
        Duration::try_from_secs_f64(deficit / self.refill_per_sec()).unwrap_or(Duration::MAX)
    }

    /// Acquire `cost` tokens and sleep for any required wait.
    pub async fn wait(&self, cost: f64) {
        let wait = self.acquire(cost);
        if !wait.is_zero() {
            tracing::debug!(wait_secs = wait.as_secs_f64(), "Rate limited, waiting for admission");
            metrics::record_rate_limit_wait(wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Current token balance after refill.
    pub fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(self.rate, self.refill_per_sec());
        bucket.tokens
    }
}
