//! gRPC channel construction.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use crate::config::schema::ChannelConfig;
use crate::errors::{TransportError, TransportStatus};
use crate::transport::stub::{Connector, RemoteStub, ServiceTarget};

/// Build a tonic endpoint for `target` with the configured keepalive options.
pub fn endpoint(target: &ServiceTarget, config: &ChannelConfig) -> Result<Endpoint, TransportError> {
    let endpoint = Endpoint::from_shared(target.uri())
        .map_err(|e| {
            TransportError::new(
                TransportStatus::InvalidArgument,
                format!("invalid endpoint {}: {}", target, e),
            )
        })?
        .http2_keep_alive_interval(Duration::from_millis(config.keepalive_interval_ms))
        .keep_alive_timeout(Duration::from_millis(config.keepalive_timeout_ms))
        .keep_alive_while_idle(config.keepalive_while_idle);

    Ok(match config.connect_timeout_ms {
        Some(ms) => endpoint.connect_timeout(Duration::from_millis(ms)),
        None => endpoint,
    })
}

/// Connector opening a lazily-connected tonic channel and binding a stub to it.
///
/// The channel dials on first use and reconnects on its own; dropping the
/// last stub clone closes it.
pub struct GrpcConnector<F> {
    bind: F,
    config: ChannelConfig,
}

impl<F, S> GrpcConnector<F>
where
    F: Fn(Channel) -> S + Send + Sync + 'static,
    S: RemoteStub,
{
    /// `bind` wraps a channel into the generated client for one service.
    pub fn new(config: ChannelConfig, bind: F) -> Self {
        Self { bind, config }
    }
}

#[async_trait]
impl<F, S> Connector for GrpcConnector<F>
where
    F: Fn(Channel) -> S + Send + Sync + 'static,
    S: RemoteStub,
{
    type Stub = S;

    async fn open(&self, target: &ServiceTarget) -> Result<S, TransportError> {
        let channel = endpoint(target, &self.config)?.connect_lazy();
        tracing::debug!(target = %target, "Channel created");
        Ok((self.bind)(channel))
    }
}
