//! Timeout enforcement.
//!
//! # Responsibilities
//! - Derive an absolute deadline from a timeout at call start
//! - Fail the guarded operation with a `Timeout` error once it passes
//! - Drop (cancel) the operation on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timer; every await inside the guard observes the deadline
//! - Nested guards report whichever boundary is reached first

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::ClientError;

/// Longest horizon a deadline is armed for; larger timeouts never fire.
const MAX_HORIZON: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Absolute expiry for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
    timeout: Duration,
}

impl Deadline {
    /// Deadline `timeout` from now. Timeouts beyond ~30 years are capped.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout.min(MAX_HORIZON),
            timeout,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// The timeout this deadline was derived from.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Whichever of the two deadlines expires first.
    pub fn earliest(self, other: Deadline) -> Deadline {
        if other.expires_at < self.expires_at {
            other
        } else {
            self
        }
    }

    /// Await `fut`, failing with a `Timeout` error if the deadline passes first.
    pub async fn guard<T, F>(&self, operation: &str, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        match tokio::time::timeout_at(self.expires_at, fut).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::timeout(format!(
                "{} timed out after {:.1}s",
                operation,
                self.timeout.as_secs_f64()
            ))),
        }
    }
}
