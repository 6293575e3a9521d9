//! Fan-out request and result shapes.

use serde::Serialize;
use serde_json::Value;

use crate::errors::ClientError;

/// One slot of a concurrent read.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    /// Label used in logs for this slot.
    pub slot: String,
    pub service: String,
    pub operation: String,
    pub request: Value,
    /// Value placed in the slot when the sub-call fails.
    pub default: Value,
}

impl AggregateRequest {
    pub fn new(
        slot: impl Into<String>,
        service: impl Into<String>,
        operation: impl Into<String>,
        request: Value,
    ) -> Self {
        Self {
            slot: slot.into(),
            service: service.into(),
            operation: operation.into(),
            request,
            default: Value::Null,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// One write in a batch applied with [`UnifiedFacade::apply`](super::UnifiedFacade::apply).
#[derive(Debug, Clone)]
pub struct ServiceCall {
    pub service: String,
    pub operation: String,
    pub request: Value,
}

impl ServiceCall {
    pub fn new(service: impl Into<String>, operation: impl Into<String>, request: Value) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            request,
        }
    }
}

/// Result of a write batch: how many calls landed and which ones failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: usize,
    /// `(operation, error)` per failed call, in submission order.
    pub failed: Vec<(String, ClientError)>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-service result of a connect or close fan-out.
#[derive(Debug, Default)]
pub struct LifecycleReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl LifecycleReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Reference data read from the data-management service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableResources {
    pub suppliers: Vec<Value>,
    pub workers: Vec<Value>,
    pub logists: Vec<Value>,
    pub equipment: Vec<Value>,
    pub tenders: Vec<Value>,
}
