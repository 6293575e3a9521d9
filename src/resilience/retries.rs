//! Retry logic.
//!
//! # Responsibilities
//! - Drive one logical call through admission, invocation and classification
//! - Retry `Connection`, `Timeout` and `Retryable` failures with backoff
//! - Surface every other kind on first occurrence
//!
//! # Design Decisions
//! - At most `max_retries + 1` invocations per call
//! - Attempts are strictly sequential
//! - The last classified error is returned unchanged on exhaustion

use std::future::Future;
use std::sync::Arc;

use crate::errors::{ClientError, Classify};
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;
use crate::resilience::rate_limit::RateLimiter;

/// Executes operations under a backoff policy and an optional rate limiter.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    service: String,
    policy: BackoffPolicy,
    limiter: Option<Arc<RateLimiter>>,
    log_events: bool,
}

impl RetryExecutor {
    pub fn new(service: impl Into<String>, policy: BackoffPolicy) -> Self {
        Self {
            service: service.into(),
            policy,
            limiter: None,
            log_events: true,
        }
    }

    /// Admit every attempt through `limiter`.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Enable or silence retry/exhaustion log events.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn rate_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    /// Run `op` until it succeeds, fails terminally or exhausts the retry budget.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify,
    {
        let max_retries = self.policy.max_retries();
        let mut attempt: u32 = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait(1.0).await;
            }

            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 && self.log_events {
                        tracing::info!(
                            service = %self.service,
                            operation = operation,
                            attempt = attempt,
                            "Call recovered after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => e.into_client_error(operation),
            };

            if !err.is_retryable() {
                if self.log_events {
                    tracing::debug!(
                        service = %self.service,
                        operation = operation,
                        kind = %err.kind(),
                        "Non-retryable failure"
                    );
                }
                return Err(err);
            }

            if attempt >= max_retries {
                if self.log_events {
                    tracing::error!(
                        service = %self.service,
                        operation = operation,
                        attempts = attempt + 1,
                        error = %err,
                        "Retry budget exhausted"
                    );
                }
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt);
            if self.log_events {
                tracing::warn!(
                    service = %self.service,
                    operation = operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, retrying"
                );
            }
            metrics::record_retry(&self.service, operation);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
