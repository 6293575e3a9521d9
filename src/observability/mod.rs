//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Connections, retry executor and rate limiter produce:
//!     → tracing events (structured fields, one span per logical call)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Composition root (the binary) installs:
//!     → logging.rs (tracing-subscriber registry)
//!     → metrics.rs (Prometheus exporter)
//! ```
//!
//! # Design Decisions
//! - The library only emits; it never installs a subscriber or recorder
//! - Every logical call carries a `call_id` for correlation
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
