//! One logical connection to one remote service.
//!
//! # Responsibilities
//! - Own the channel/stub pair and the lifecycle state machine
//! - Run every call under a deadline, through the retry executor
//! - Own the per-connection rate limiter and backoff policy

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_service, ValidationError};
use crate::config::ConfigError;
use crate::connection::roles::ServiceRole;
use crate::connection::state::ConnectionState;
use crate::errors::{ClientError, ClientResult, Classify, TransportError};
use crate::observability::metrics;
use crate::resilience::{BackoffPolicy, Deadline, RateLimiter, RetryExecutor};
use crate::transport::{Connector, RemoteStub, ServiceTarget};

/// Health checks get this fraction of the default call timeout.
const HEALTH_CHECK_DIVISOR: u32 = 6;

/// Lifecycle and call contract shared by every service connection.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    fn name(&self) -> &str;

    fn target(&self) -> &ServiceTarget;

    async fn state(&self) -> ConnectionState;

    /// Open the channel and verify the service answers a health check.
    async fn connect(&self) -> ClientResult<()>;

    /// Health check. Never fails; `false` unless connected and healthy.
    async fn ping(&self) -> bool;

    /// Release the channel. Idempotent.
    async fn close(&self) -> ClientResult<()>;

    /// Invoke `operation`; `timeout` overrides the connection default.
    async fn call(
        &self,
        operation: &str,
        request: Value,
        timeout: Option<Duration>,
    ) -> ClientResult<Value>;
}

/// Typed call: encode `request`, decode the response into `Resp`.
pub async fn invoke<C, Req, Resp>(client: &C, operation: &str, request: &Req) -> ClientResult<Resp>
where
    C: ServiceClient + ?Sized,
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let request = serde_json::to_value(request).map_err(|e| {
        ClientError::validation(format!("{} failed: cannot encode request: {}", operation, e))
    })?;

    let response = client.call(operation, request, None).await?;

    serde_json::from_value(response).map_err(|e| {
        ClientError::unknown(format!("{} failed: unexpected response: {}", operation, e))
    })
}

struct Link<S> {
    state: ConnectionState,
    stub: Option<Arc<S>>,
}

/// Connection to one remote service over a [`Connector`].
pub struct ServiceConnection<K: Connector> {
    name: String,
    target: ServiceTarget,
    timeout: Duration,
    connector: K,
    executor: RetryExecutor,
    log_events: bool,
    link: RwLock<Link<K::Stub>>,
}

impl<K: Connector> ServiceConnection<K> {
    /// Create a disconnected connection from validated settings.
    pub fn new(name: impl Into<String>, config: &ServiceConfig, connector: K) -> Result<Self, ConfigError> {
        let name = name.into();
        validate_service(&name, config).map_err(ConfigError::Validation)?;

        let invalid = |field: &str, reason: String| {
            ConfigError::Validation(vec![ValidationError {
                field: format!("{}.{}", name, field),
                reason,
            }])
        };

        let port = config
            .port
            .ok_or_else(|| invalid("port", "must be set".to_string()))?;
        let timeout = Duration::try_from_secs_f64(config.timeout_secs)
            .map_err(|e| invalid("timeout_secs", e.to_string()))?;

        let policy = BackoffPolicy::from_config(config.max_retries, &config.backoff);
        let mut executor = RetryExecutor::new(name.clone(), policy).with_logging(config.enable_logging);
        if let Some(rate) = config.rate_limit {
            let limiter = RateLimiter::per_second(rate)
                .map_err(|e| invalid("rate_limit", e.message().to_string()))?;
            executor = executor.with_rate_limiter(Arc::new(limiter));
        }

        Ok(Self {
            target: ServiceTarget::new(config.host.clone(), port),
            name,
            timeout,
            connector,
            executor,
            log_events: config.enable_logging,
            link: RwLock::new(Link {
                state: ConnectionState::Disconnected,
                stub: None,
            }),
        })
    }

    /// Create a connection named after a known service role.
    pub fn for_role(role: ServiceRole, config: &ServiceConfig, connector: K) -> Result<Self, ConfigError> {
        Self::new(role.service_name(), config, connector)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn health_check_timeout(&self) -> Duration {
        self.timeout / HEALTH_CHECK_DIVISOR
    }

    pub fn rate_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.executor.rate_limiter()
    }

    pub fn backoff_policy(&self) -> &BackoffPolicy {
        self.executor.policy()
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    async fn connected_stub(&self) -> ClientResult<Arc<K::Stub>> {
        let link = self.link.read().await;
        match (&link.stub, link.state) {
            (Some(stub), ConnectionState::Connected) => Ok(Arc::clone(stub)),
            (_, state) => Err(ClientError::connection(format!(
                "{} is not connected (state: {})",
                self.name, state
            ))),
        }
    }

    async fn health_check(&self, stub: &Arc<K::Stub>) -> ClientResult<()> {
        let deadline = Deadline::after(self.health_check_timeout());
        let probe = self.executor.run("Health check", || {
            let stub = Arc::clone(stub);
            async move {
                match stub.ping().await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(TransportError::unavailable("service reported not serving")),
                    Err(e) => Err(e),
                }
            }
        });
        deadline.guard("Health check", probe).await
    }

    /// Release a stub outside of `close()`; failures are only logged.
    async fn release_quietly(&self, stub: &K::Stub) {
        if let Err(e) = self.connector.release(stub).await {
            tracing::warn!(service = %self.name, error = %e, "Failed to release channel");
        }
    }

    /// Abort a connect attempt, unless the connection was closed meanwhile.
    async fn abort_connect(&self, cause: ClientError) -> ClientError {
        {
            let mut link = self.link.write().await;
            if link.state == ConnectionState::Connecting {
                link.state = ConnectionState::Disconnected;
            }
        }

        let err = ClientError::connection(format!(
            "Connection to {} at {} failed: {}",
            self.name,
            self.target,
            cause.message()
        ))
        .with_details(json!({
            "service": self.name,
            "target": self.target.to_string(),
            "cause_kind": cause.kind(),
            "cause": cause.message(),
        }));

        if self.log_events {
            tracing::error!(service = %self.name, target = %self.target, error = %err, "Failed to connect");
        }
        metrics::record_service_health(&self.name, false);
        err
    }
}

#[async_trait]
impl<K: Connector> ServiceClient for ServiceConnection<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> &ServiceTarget {
        &self.target
    }

    async fn state(&self) -> ConnectionState {
        self.link.read().await.state
    }

    async fn connect(&self) -> ClientResult<()> {
        {
            let mut link = self.link.write().await;
            if !link.state.can_connect() {
                return Err(ClientError::connection(format!(
                    "cannot connect {} while {}",
                    self.name, link.state
                )));
            }
            link.state = ConnectionState::Connecting;
        }

        let stub = match self.connector.open(&self.target).await {
            Ok(stub) => Arc::new(stub),
            Err(e) => return Err(self.abort_connect(e.into_client_error("Open channel")).await),
        };

        if let Err(e) = self.health_check(&stub).await {
            self.release_quietly(&stub).await;
            return Err(self.abort_connect(e).await);
        }

        let mut link = self.link.write().await;
        if link.state != ConnectionState::Connecting {
            drop(link);
            self.release_quietly(&stub).await;
            return Err(ClientError::connection(format!(
                "{} was closed while connecting",
                self.name
            )));
        }
        link.state = ConnectionState::Connected;
        link.stub = Some(stub);
        drop(link);

        if self.log_events {
            tracing::info!(service = %self.name, target = %self.target, "Connected");
        }
        metrics::record_service_health(&self.name, true);
        Ok(())
    }

    async fn ping(&self) -> bool {
        let stub = match self.connected_stub().await {
            Ok(stub) => stub,
            Err(e) => {
                tracing::debug!(service = %self.name, reason = %e, "Ping skipped");
                return false;
            }
        };

        let deadline = Deadline::after(self.health_check_timeout());
        let result = deadline
            .guard("Ping", async {
                if let Some(limiter) = self.executor.rate_limiter() {
                    limiter.wait(1.0).await;
                }
                stub.ping().await.map_err(|e| e.into_client_error("Ping"))
            })
            .await;

        let healthy = matches!(result, Ok(true));
        metrics::record_service_health(&self.name, healthy);
        if healthy {
            return true;
        }

        if self.log_events {
            match &result {
                Err(e) => tracing::warn!(service = %self.name, error = %e, "Ping failed"),
                Ok(_) => tracing::warn!(service = %self.name, "Ping reported not serving"),
            }
        }

        let released = {
            let mut link = self.link.write().await;
            let same_stub = link.stub.as_ref().is_some_and(|s| Arc::ptr_eq(s, &stub));
            if link.state.is_connected() && same_stub {
                link.state = ConnectionState::Disconnected;
                link.stub.take()
            } else {
                None
            }
        };
        if let Some(stub) = released {
            self.release_quietly(&stub).await;
        }
        false
    }

    async fn close(&self) -> ClientResult<()> {
        let stub = {
            let mut link = self.link.write().await;
            if link.state.is_closed() {
                return Ok(());
            }
            link.state = ConnectionState::Closed;
            link.stub.take()
        };
        metrics::record_service_health(&self.name, false);

        if let Some(stub) = stub {
            self.connector
                .release(&stub)
                .await
                .map_err(|e| e.into_client_error(&format!("Close {}", self.name)))?;
        }

        if self.log_events {
            tracing::info!(service = %self.name, "Disconnected");
        }
        Ok(())
    }

    async fn call(
        &self,
        operation: &str,
        request: Value,
        timeout: Option<Duration>,
    ) -> ClientResult<Value> {
        let start = Instant::now();
        let span = tracing::info_span!(
            "rpc_call",
            service = %self.name,
            operation = operation,
            call_id = %Uuid::new_v4()
        );

        let result = async {
            let deadline = Deadline::after(timeout.unwrap_or(self.timeout));
            let stub = self.connected_stub().await?;
            let attempts = self.executor.run(operation, || {
                let stub = Arc::clone(&stub);
                let request = request.clone();
                async move { stub.invoke(operation, request).await }
            });
            deadline.guard(operation, attempts).await
        }
        .instrument(span)
        .await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        metrics::record_call(&self.name, operation, outcome, start);
        result
    }
}
