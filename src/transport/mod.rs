//! Transport subsystem: channels and remote stubs.
//!
//! # Data Flow
//! ```text
//! ServiceConnection::connect
//!     → Connector::open (channel to host:port, stub bound to it)
//!     → RemoteStub::ping / RemoteStub::invoke (per call)
//!     → Connector::release (on close or failed connect)
//! ```
//!
//! # Design Decisions
//! - Payloads are opaque `serde_json::Value`s; the stub owns the wire mapping
//! - Stubs report failures as `TransportError`; classification happens above
//! - `grpc.rs` builds real tonic channels, tests plug in scripted connectors

pub mod grpc;
pub mod probe;
pub mod stub;

pub use grpc::GrpcConnector;
pub use probe::{ReachabilityConnector, ReachabilityStub};
pub use stub::{Connector, RemoteStub, ServiceTarget};
