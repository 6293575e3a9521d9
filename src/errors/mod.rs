//! Error taxonomy and classification.
//!
//! # Data Flow
//! ```text
//! Remote stub fails:
//!     → status.rs (TransportError: status code + message + transient flag)
//!     → classifier.rs (fixed status → ErrorKind table)
//!     → kinds.rs (ClientError: kind + message + details)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - `ClientError` is the only error shape that leaves the crate
//! - Classification is a pure function over the status code
//! - Only `Connection`, `Timeout` and `Retryable` are retried

pub mod classifier;
pub mod kinds;
pub mod status;

pub use classifier::{classify, Classify};
pub use kinds::{ClientError, ClientResult, ErrorKind};
pub use status::{TransportError, TransportStatus};
