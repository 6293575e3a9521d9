//! Fixed collection of named service connections.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{join_all, try_join_all};
use serde_json::{json, Value};

use crate::config::{ClientConfig, ConfigError};
use crate::connection::{Lifecycle, ServiceClient, ServiceConnection, ServiceRole};
use crate::errors::{ClientError, ClientResult};
use crate::facade::aggregate::{
    AggregateRequest, AvailableResources, BatchOutcome, LifecycleReport, ServiceCall,
};
use crate::transport::Connector;

/// Reference-data reads issued by [`UnifiedFacade::available_resources`].
const RESOURCE_SLOTS: [(&str, &str); 5] = [
    ("suppliers", "get_all_suppliers"),
    ("workers", "get_all_workers"),
    ("logists", "get_all_logists"),
    ("equipment", "get_all_equipment"),
    ("tenders", "get_all_tenders"),
];

/// Drives several service connections as one unit.
///
/// The set of services is fixed at construction and kept in insertion order.
/// Lifecycle fan-outs never stop at the first failure; each service's
/// outcome is reported separately.
pub struct UnifiedFacade {
    services: Vec<(String, Arc<dyn ServiceClient>)>,
}

impl UnifiedFacade {
    /// Build from named clients. Names must be unique.
    pub fn new(services: Vec<(String, Arc<dyn ServiceClient>)>) -> ClientResult<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &services {
            if !seen.insert(name.as_str()) {
                return Err(ClientError::validation(format!(
                    "duplicate service name: {}",
                    name
                )));
            }
        }
        Ok(Self { services })
    }

    /// Build the simulation + data-management pair from configuration.
    pub fn from_config<S, D>(config: &ClientConfig, simulation: S, data: D) -> Result<Self, ConfigError>
    where
        S: Connector,
        D: Connector,
    {
        let sim = ServiceConnection::for_role(ServiceRole::Simulation, &config.simulation, simulation)?;
        let db = ServiceConnection::for_role(ServiceRole::DataManagement, &config.data, data)?;

        Ok(Self {
            services: vec![
                (sim.name().to_string(), Arc::new(sim) as Arc<dyn ServiceClient>),
                (db.name().to_string(), Arc::new(db) as Arc<dyn ServiceClient>),
            ],
        })
    }

    pub fn service(&self, name: &str) -> Option<&Arc<dyn ServiceClient>> {
        self.services
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, client)| client)
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn require(&self, name: &str) -> ClientResult<&Arc<dyn ServiceClient>> {
        self.service(name)
            .ok_or_else(|| ClientError::validation(format!("unknown service: {}", name)))
    }

    /// Connect every service concurrently and report each outcome.
    pub async fn connect_all_report(&self) -> LifecycleReport {
        tracing::info!(services = self.services.len(), "Connecting to services");

        let results = join_all(
            self.services
                .iter()
                .map(|(name, client)| async move { (name, client.connect().await) }),
        )
        .await;

        let mut report = LifecycleReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => report.succeeded.push(name.clone()),
                Err(e) => report.failed.push((name.clone(), e)),
            }
        }
        report
    }

    /// Connect every service concurrently.
    ///
    /// Fails with a `Connection` error naming each service that did not
    /// connect. Services that did connect stay connected.
    pub async fn connect_all(&self) -> ClientResult<()> {
        let report = self.connect_all_report().await;
        if report.is_complete() {
            tracing::info!("Connected to all services");
            return Ok(());
        }

        let failures: Vec<Value> = report
            .failed
            .iter()
            .map(|(name, e)| {
                json!({
                    "service": name,
                    "kind": e.kind(),
                    "error": e.message(),
                })
            })
            .collect();

        let err = ClientError::connection(format!(
            "Failed to connect: {}",
            report.failed_names().join(", ")
        ))
        .with_details(json!({
            "connected": report.succeeded,
            "failed": failures,
        }));
        tracing::error!(error = %err, "Connect failed");
        Err(err)
    }

    /// Close every service concurrently. Never stops early.
    pub async fn close_all(&self) -> LifecycleReport {
        tracing::info!("Closing connections");

        let results = join_all(
            self.services
                .iter()
                .map(|(name, client)| async move { (name, client.close().await) }),
        )
        .await;

        let mut report = LifecycleReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => report.succeeded.push(name.clone()),
                Err(e) => {
                    tracing::warn!(service = %name, error = %e, "Close failed");
                    report.failed.push((name.clone(), e));
                }
            }
        }

        tracing::info!("All connections closed");
        report
    }

    /// Health of every service by name.
    pub async fn ping_all(&self) -> BTreeMap<String, bool> {
        let results = join_all(
            self.services
                .iter()
                .map(|(name, client)| async move { (name.clone(), client.ping().await) }),
        )
        .await;
        results.into_iter().collect()
    }

    /// Call one operation on a named service.
    pub async fn call(&self, service: &str, operation: &str, request: Value) -> ClientResult<Value> {
        self.require(service)?.call(operation, request, None).await
    }

    /// Run reads concurrently; results are in request order.
    ///
    /// A failed slot is logged and takes the request's default value.
    pub async fn gather(&self, requests: Vec<AggregateRequest>) -> Vec<Value> {
        let results = join_all(
            requests
                .iter()
                .map(|req| self.call(&req.service, &req.operation, req.request.clone())),
        )
        .await;

        requests
            .into_iter()
            .zip(results)
            .map(|(req, result)| match result {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        slot = %req.slot,
                        service = %req.service,
                        operation = %req.operation,
                        error = %e,
                        "Slot failed, using default"
                    );
                    req.default
                }
            })
            .collect()
    }

    /// Run reads concurrently; the first failure fails the whole set.
    pub async fn gather_strict(&self, requests: Vec<AggregateRequest>) -> ClientResult<Vec<Value>> {
        try_join_all(
            requests
                .iter()
                .map(|req| self.call(&req.service, &req.operation, req.request.clone())),
        )
        .await
    }

    /// Apply a batch of writes concurrently and count the outcomes.
    pub async fn apply(&self, calls: Vec<ServiceCall>) -> BatchOutcome {
        let results = join_all(
            calls
                .iter()
                .map(|c| self.call(&c.service, &c.operation, c.request.clone())),
        )
        .await;

        let mut outcome = BatchOutcome::default();
        for (call, result) in calls.into_iter().zip(results) {
            match result {
                Ok(_) => outcome.succeeded += 1,
                Err(e) => outcome.failed.push((call.operation, e)),
            }
        }

        if !outcome.all_succeeded() {
            tracing::warn!(
                succeeded = outcome.succeeded,
                total = outcome.total(),
                "Batch partially applied"
            );
        }
        outcome
    }

    /// Read all reference data from the data-management service.
    ///
    /// Failed or malformed slots come back empty.
    pub async fn available_resources(&self) -> AvailableResources {
        let service = ServiceRole::DataManagement.service_name();
        let requests = RESOURCE_SLOTS
            .iter()
            .map(|(slot, operation)| {
                AggregateRequest::new(*slot, service, *operation, json!({})).with_default(json!([]))
            })
            .collect();

        let mut lists = RESOURCE_SLOTS
            .iter()
            .zip(self.gather(requests).await)
            .map(|((slot, _), value)| into_list(slot, value));

        AvailableResources {
            suppliers: lists.next().unwrap_or_default(),
            workers: lists.next().unwrap_or_default(),
            logists: lists.next().unwrap_or_default(),
            equipment: lists.next().unwrap_or_default(),
            tenders: lists.next().unwrap_or_default(),
        }
    }
}

/// Accept either a bare array or an object wrapping it under the slot name.
fn into_list(slot: &str, value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove(slot) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!(slot = %slot, "Response has no list, using empty");
                Vec::new()
            }
        },
        _ => {
            tracing::warn!(slot = %slot, "Response is not a list, using empty");
            Vec::new()
        }
    }
}

#[async_trait]
impl Lifecycle for UnifiedFacade {
    async fn start(&self) -> ClientResult<()> {
        self.connect_all().await
    }

    async fn stop(&self) {
        self.close_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use crate::errors::ErrorKind;
    use crate::transport::ServiceTarget;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::RwLock;

    struct FakeService {
        name: String,
        target: ServiceTarget,
        reachable: bool,
        state: RwLock<ConnectionState>,
        responses: HashMap<String, ClientResult<Value>>,
        closes: AtomicU32,
    }

    impl FakeService {
        fn new(name: &str, reachable: bool) -> Self {
            Self {
                name: name.to_string(),
                target: ServiceTarget::new("localhost", 50052),
                reachable,
                state: RwLock::new(ConnectionState::Disconnected),
                responses: HashMap::new(),
                closes: AtomicU32::new(0),
            }
        }

        fn respond(mut self, operation: &str, result: ClientResult<Value>) -> Self {
            self.responses.insert(operation.to_string(), result);
            self
        }
    }

    #[async_trait]
    impl ServiceClient for FakeService {
        fn name(&self) -> &str {
            &self.name
        }

        fn target(&self) -> &ServiceTarget {
            &self.target
        }

        async fn state(&self) -> ConnectionState {
            *self.state.read().await
        }

        async fn connect(&self) -> ClientResult<()> {
            if !self.reachable {
                return Err(ClientError::connection(format!("{} refused", self.name)));
            }
            *self.state.write().await = ConnectionState::Connected;
            Ok(())
        }

        async fn ping(&self) -> bool {
            self.state.read().await.is_connected()
        }

        async fn close(&self) -> ClientResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            *self.state.write().await = ConnectionState::Closed;
            Ok(())
        }

        async fn call(
            &self,
            operation: &str,
            _request: Value,
            _timeout: Option<Duration>,
        ) -> ClientResult<Value> {
            self.responses
                .get(operation)
                .cloned()
                .unwrap_or_else(|| Err(ClientError::unknown(format!("no response for {}", operation))))
        }
    }

    fn facade(services: Vec<Arc<FakeService>>) -> UnifiedFacade {
        UnifiedFacade::new(
            services
                .into_iter()
                .map(|s| (s.name.clone(), s as Arc<dyn ServiceClient>))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a: Arc<dyn ServiceClient> = Arc::new(FakeService::new("database_service", true));
        let b: Arc<dyn ServiceClient> = Arc::new(FakeService::new("database_service", true));
        let err = UnifiedFacade::new(vec![
            ("database_service".to_string(), a),
            ("database_service".to_string(), b),
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_from_config_names_roles() {
        use crate::transport::ReachabilityConnector;

        let facade = UnifiedFacade::from_config(
            &ClientConfig::default(),
            ReachabilityConnector::default(),
            ReachabilityConnector::default(),
        )
        .unwrap();
        assert_eq!(facade.names(), vec!["simulation_service", "database_service"]);
        assert_eq!(
            facade.service("database_service").unwrap().target(),
            &ServiceTarget::new("localhost", 50052)
        );
    }

    #[tokio::test]
    async fn test_connect_all_isolates_failures() {
        let sim = Arc::new(FakeService::new("simulation_service", true));
        let db = Arc::new(FakeService::new("database_service", false));
        let facade = facade(vec![Arc::clone(&sim), Arc::clone(&db)]);

        let err = facade.connect_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.message().contains("database_service"));
        assert_eq!(err.details().unwrap()["connected"][0], "simulation_service");

        // No rollback of the service that did connect.
        assert_eq!(sim.state().await, ConnectionState::Connected);

        let health = facade.ping_all().await;
        assert_eq!(health["simulation_service"], true);
        assert_eq!(health["database_service"], false);
    }

    #[tokio::test]
    async fn test_close_all_reaches_every_service() {
        let sim = Arc::new(FakeService::new("simulation_service", true));
        let db = Arc::new(FakeService::new("database_service", false));
        let facade = facade(vec![Arc::clone(&sim), Arc::clone(&db)]);

        let report = facade.close_all().await;
        assert!(report.is_complete());
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(sim.closes.load(Ordering::SeqCst), 1);
        assert_eq!(db.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gather_defaults_failed_slots() {
        let db = Arc::new(
            FakeService::new("database_service", true)
                .respond("get_all_workers", Ok(json!([{"worker_id": "w-1"}])))
                .respond("get_all_tenders", Err(ClientError::timeout("slow"))),
        );
        let facade = facade(vec![db]);

        let values = facade
            .gather(vec![
                AggregateRequest::new("workers", "database_service", "get_all_workers", json!({})),
                AggregateRequest::new("tenders", "database_service", "get_all_tenders", json!({}))
                    .with_default(json!([])),
                AggregateRequest::new("sim", "simulation_service", "get_simulation", json!({})),
            ])
            .await;

        assert_eq!(values, vec![json!([{"worker_id": "w-1"}]), json!([]), Value::Null]);
    }

    #[tokio::test]
    async fn test_gather_strict_fails_on_any_slot() {
        let db = Arc::new(
            FakeService::new("database_service", true)
                .respond("get_all_workers", Ok(json!([])))
                .respond("get_all_tenders", Err(ClientError::timeout("slow"))),
        );
        let facade = facade(vec![db]);

        let err = facade
            .gather_strict(vec![
                AggregateRequest::new("workers", "database_service", "get_all_workers", json!({})),
                AggregateRequest::new("tenders", "database_service", "get_all_tenders", json!({})),
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_apply_counts_outcomes() {
        let sim = Arc::new(
            FakeService::new("simulation_service", true)
                .respond("set_logist", Ok(json!({"success": true})))
                .respond("add_tender", Err(ClientError::validation("unknown tender"))),
        );
        let facade = facade(vec![sim]);

        let outcome = facade
            .apply(vec![
                ServiceCall::new("simulation_service", "set_logist", json!({"worker_id": "l-1"})),
                ServiceCall::new("simulation_service", "add_tender", json!({"tender_id": "t-9"})),
            ])
            .await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "add_tender");
        assert!(!outcome.all_succeeded());
    }

    #[tokio::test]
    async fn test_available_resources_tolerates_bad_slots() {
        let db = Arc::new(
            FakeService::new("database_service", true)
                .respond("get_all_suppliers", Ok(json!([{"supplier_id": "s-1"}])))
                .respond("get_all_workers", Ok(json!({"workers": [{"worker_id": "w-1"}]})))
                .respond("get_all_logists", Ok(json!("not a list")))
                .respond("get_all_equipment", Err(ClientError::connection("down"))),
        );
        let facade = facade(vec![db]);

        let resources = facade.available_resources().await;
        assert_eq!(resources.suppliers.len(), 1);
        assert_eq!(resources.workers[0]["worker_id"], "w-1");
        assert!(resources.logists.is_empty());
        assert!(resources.equipment.is_empty());
        assert!(resources.tenders.is_empty());
    }

    #[tokio::test]
    async fn test_call_unknown_service() {
        let facade = facade(vec![]);
        let err = facade.call("billing", "get", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
