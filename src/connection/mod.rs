//! Service connection subsystem.
//!
//! # Data Flow
//! ```text
//! connect():
//!     Disconnected → Connecting
//!     → Connector::open (channel + stub)
//!     → health check (RetryExecutor under a short Deadline)
//!     → Connected, or release + back to Disconnected
//!
//! call(operation):
//!     Deadline → RetryExecutor { RateLimiter → RemoteStub::invoke → classify }
//!
//! ping():  Connected ──failed health check──▶ Disconnected
//! close(): any ──▶ Closed (idempotent)
//! ```
//!
//! # Design Decisions
//! - One owner drives lifecycle transitions; calls only read the state
//! - A connection owns its rate limiter, backoff policy and default timeout
//! - Connect failures always surface as `Connection` errors

pub mod roles;
pub mod scoped;
pub mod service;
pub mod state;

pub use roles::ServiceRole;
pub use scoped::{scoped, Lifecycle};
pub use service::{invoke, ServiceClient, ServiceConnection};
pub use state::ConnectionState;
