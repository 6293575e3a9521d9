//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::BackoffConfig;

/// Retry delay schedule: `min(base × 2^attempt, max)`, optionally jittered.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl BackoffPolicy {
    /// Create a policy. `max_delay` is raised to `base_delay` if smaller.
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration, jitter: bool) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter,
        }
    }

    pub fn from_config(max_retries: u32, config: &BackoffConfig) -> Self {
        Self::new(
            max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.jitter,
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn jitter_enabled(&self) -> bool {
        self.jitter
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = if self.jitter {
            rand::thread_rng().gen_range(0.5..1.0)
        } else {
            1.0
        };
        self.delay_for_with_factor(attempt, factor)
    }

    /// Delay with an explicit jitter factor, ignored when jitter is disabled.
    pub fn delay_for_with_factor(&self, attempt: u32, factor: f64) -> Duration {
        let exponential = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let capped = self
            .base_delay
            .checked_mul(exponential)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if self.jitter {
            capped.mul_f64(factor.clamp(0.5, 1.0))
        } else {
            capped
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(3, &BackoffConfig::default())
    }
}
