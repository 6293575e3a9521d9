//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical call:
//!     → timeouts.rs (Deadline starts the clock, guards the whole call)
//!     → retries.rs (attempt loop)
//!         → rate_limit.rs (admission per attempt)
//!         → remote stub invocation
//!         → errors::classify (retryable or terminal)
//!         → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Attempts of one call never overlap
//! - Retry budget exhaustion re-raises the last classified error unchanged
//! - Rate limiting is opt-in and per connection

pub mod backoff;
pub mod rate_limit;
pub mod retries;
pub mod timeouts;

pub use backoff::BackoffPolicy;
pub use rate_limit::RateLimiter;
pub use retries::RetryExecutor;
pub use timeouts::Deadline;
