//! Reachability probing without generated service clients.
//!
//! The stub's health check performs a full HTTP/2 handshake against the
//! target. It cannot invoke service operations.

use async_trait::async_trait;
use serde_json::Value;
use tonic::transport::Endpoint;

use crate::config::schema::ChannelConfig;
use crate::errors::{TransportError, TransportStatus};
use crate::transport::grpc;
use crate::transport::stub::{Connector, RemoteStub, ServiceTarget};

/// Stub answering `ping` by dialing its endpoint.
pub struct ReachabilityStub {
    endpoint: Endpoint,
}

#[async_trait]
impl RemoteStub for ReachabilityStub {
    async fn ping(&self) -> Result<bool, TransportError> {
        self.endpoint.connect().await?;
        Ok(true)
    }

    async fn invoke(&self, operation: &str, _request: Value) -> Result<Value, TransportError> {
        Err(TransportError::new(
            TransportStatus::Other(tonic::Code::Unimplemented as i32),
            format!("reachability probe cannot invoke '{}'", operation),
        ))
    }
}

/// Connector producing [`ReachabilityStub`]s.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityConnector {
    config: ChannelConfig,
}

impl ReachabilityConnector {
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for ReachabilityConnector {
    type Stub = ReachabilityStub;

    async fn open(&self, target: &ServiceTarget) -> Result<ReachabilityStub, TransportError> {
        Ok(ReachabilityStub {
            endpoint: grpc::endpoint(target, &self.config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{classify, ErrorKind};

    #[tokio::test]
    async fn test_unreachable_port_fails_ping() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let stub = ReachabilityConnector::default()
            .open(&ServiceTarget::new("127.0.0.1", port))
            .await
            .unwrap();
        let err = stub.ping().await.unwrap_err();
        assert_eq!(classify(&err), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn test_invoke_is_unsupported() {
        let stub = ReachabilityConnector::default()
            .open(&ServiceTarget::new("127.0.0.1", 1))
            .await
            .unwrap();
        let err = stub.invoke("get_all_suppliers", Value::Null).await.unwrap_err();
        assert_eq!(classify(&err), ErrorKind::Unknown);
    }
}
