//! Multi-service facade.
//!
//! # Data Flow
//! ```text
//! Application
//!     → unified.rs (pick service by name, fan out concurrently)
//!     → ServiceConnection::call per slot
//!     → aggregate.rs (slot defaults, batch counts, lifecycle reports)
//! ```
//!
//! # Design Decisions
//! - Services are fixed at construction
//! - One failed service never aborts the others
//! - Strict variants are opt-in

pub mod aggregate;
pub mod unified;

pub use aggregate::{AggregateRequest, AvailableResources, BatchOutcome, LifecycleReport, ServiceCall};
pub use unified::UnifiedFacade;
