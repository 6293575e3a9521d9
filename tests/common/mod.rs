//! Scripted connectors and stubs for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use rpc_resilience::config::ServiceConfig;
use rpc_resilience::connection::ServiceRole;
use rpc_resilience::errors::{TransportError, TransportStatus};
use rpc_resilience::transport::{Connector, RemoteStub, ServiceTarget};

/// Shared behaviour of one fake remote service.
///
/// Invocations pop per-operation results; an empty queue answers
/// `{"operation": <name>}`. Pings pop their own queue and default to healthy.
#[derive(Default)]
pub struct Script {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    pings: Mutex<VecDeque<Result<bool, TransportError>>>,
    delay: Mutex<Duration>,
    fail_open: AtomicBool,
    opened: AtomicU32,
    released: AtomicU32,
    invocations: AtomicU32,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, operation: &str, result: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(result);
    }

    /// Queue the same failure `times` times.
    pub fn fail(&self, operation: &str, status: TransportStatus, times: usize) {
        for _ in 0..times {
            self.respond(operation, Err(TransportError::new(status, "injected failure")));
        }
    }

    pub fn ping_result(&self, result: Result<bool, TransportError>) {
        self.pings.lock().unwrap().push_back(result);
    }

    /// Delay every invocation by `delay`.
    pub fn slow(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn refuse_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }
}

pub struct ScriptedStub {
    script: Arc<Script>,
}

#[async_trait]
impl RemoteStub for ScriptedStub {
    async fn ping(&self) -> Result<bool, TransportError> {
        let next = self.script.pings.lock().unwrap().pop_front();
        next.unwrap_or(Ok(true))
    }

    async fn invoke(&self, operation: &str, _request: Value) -> Result<Value, TransportError> {
        self.script.invocations.fetch_add(1, Ordering::SeqCst);

        let delay = *self.script.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .script
            .responses
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front());
        next.unwrap_or_else(|| Ok(json!({ "operation": operation })))
    }
}

pub struct ScriptedConnector {
    script: Arc<Script>,
}

impl ScriptedConnector {
    pub fn new(script: &Arc<Script>) -> Self {
        Self {
            script: Arc::clone(script),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Stub = ScriptedStub;

    async fn open(&self, _target: &ServiceTarget) -> Result<ScriptedStub, TransportError> {
        if self.script.fail_open.load(Ordering::SeqCst) {
            return Err(TransportError::unavailable("connection refused"));
        }
        self.script.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedStub {
            script: Arc::clone(&self.script),
        })
    }

    async fn release(&self, _stub: &ScriptedStub) -> Result<(), TransportError> {
        self.script.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Role defaults with deterministic backoff.
pub fn service_config(role: ServiceRole, max_retries: u32) -> ServiceConfig {
    let mut config = ServiceConfig::for_role(role);
    config.max_retries = max_retries;
    config.backoff.jitter = false;
    config
}
