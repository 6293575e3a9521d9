//! Resilient client core for remote RPC services.
//!
//! Rate limiting, retry with backoff, deadlines and error classification
//! wrapped around per-service connections, plus a facade that drives
//! several services together.

pub mod config;
pub mod connection;
pub mod errors;
pub mod facade;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::schema::ClientConfig;
pub use connection::{scoped, ServiceClient, ServiceConnection};
pub use errors::{ClientError, ClientResult, ErrorKind};
pub use facade::UnifiedFacade;
