//! Remote stub and connector contracts.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::TransportError;

/// Network identity of a remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceTarget {
    pub host: String,
    pub port: u16,
}

impl ServiceTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Plaintext HTTP/2 endpoint URI.
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Handle to a remote service bound to one open channel.
#[async_trait]
pub trait RemoteStub: Send + Sync + 'static {
    /// Health check; `Ok(true)` means the service is serving.
    async fn ping(&self) -> Result<bool, TransportError>;

    /// Invoke `operation` with `request`.
    async fn invoke(&self, operation: &str, request: Value) -> Result<Value, TransportError>;
}

/// Opens and releases the channel behind a stub.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Stub: RemoteStub;

    /// Open a channel to `target` and bind a stub to it.
    async fn open(&self, target: &ServiceTarget) -> Result<Self::Stub, TransportError>;

    /// Release the channel behind `stub`.
    async fn release(&self, _stub: &Self::Stub) -> Result<(), TransportError> {
        Ok(())
    }
}
