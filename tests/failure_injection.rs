//! Failure injection through a real connection: retries, deadlines, rate limits.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use rpc_resilience::connection::{ConnectionState, ServiceRole};
use rpc_resilience::errors::{ErrorKind, TransportError, TransportStatus};
use rpc_resilience::{ServiceClient, ServiceConnection};

mod common;

use common::{service_config, Script, ScriptedConnector};

async fn connected(script: &std::sync::Arc<Script>, max_retries: u32) -> ServiceConnection<ScriptedConnector> {
    let config = service_config(ServiceRole::DataManagement, max_retries);
    let conn = ServiceConnection::for_role(ServiceRole::DataManagement, &config, ScriptedConnector::new(script))
        .unwrap();
    conn.connect().await.unwrap();
    conn
}

#[tokio::test(start_paused = true)]
async fn test_retry_until_success() {
    let script = Script::new();
    script.fail("get_all_workers", TransportStatus::Unavailable, 3);
    script.respond("get_all_workers", Ok(json!([{"worker_id": "w-1"}])));
    let conn = connected(&script, 3).await;

    let start = Instant::now();
    let workers = conn.call("get_all_workers", json!({}), Some(Duration::from_secs(60))).await.unwrap();

    assert_eq!(workers[0]["worker_id"], "w-1");
    assert_eq!(script.invocations(), 4);
    // 1s + 2s + 4s of backoff
    assert!(start.elapsed() >= Duration::from_secs(7));
    assert!(start.elapsed() < Duration::from_millis(7100));
}

#[tokio::test(start_paused = true)]
async fn test_budget_exhaustion_keeps_last_kind() {
    let script = Script::new();
    script.fail("run_simulation", TransportStatus::DeadlineExceeded, 10);
    let conn = connected(&script, 2).await;

    let err = conn
        .call("run_simulation", json!({"simulation_id": "s-1"}), Some(Duration::from_secs(60)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(script.invocations(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_surfaces_immediately() {
    let script = Script::new();
    script.fail("create_supplier", TransportStatus::InvalidArgument, 1);
    script.fail("get_supplier", TransportStatus::NotFound, 1);
    script.fail("get_simulation", TransportStatus::PermissionDenied, 1);
    let conn = connected(&script, 3).await;

    let start = Instant::now();
    let err = conn.call("create_supplier", json!({}), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "create_supplier failed: injected failure");

    let err = conn.call("get_supplier", json!({}), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = conn.call("get_simulation", json!({}), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    assert_eq!(script.invocations(), 3);
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_transient_status_is_retried() {
    let script = Script::new();
    script.respond(
        "add_tender",
        Err(TransportError::new(TransportStatus::Other(10), "aborted").transient()),
    );
    let conn = connected(&script, 1).await;

    let response = conn.call("add_tender", json!({}), None).await.unwrap();
    assert_eq!(response["operation"], "add_tender");
    assert_eq!(script.invocations(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_call_hits_deadline() {
    let script = Script::new();
    script.slow(Duration::from_secs(10));
    let conn = connected(&script, 3).await;

    let start = Instant::now();
    let err = conn
        .call("run_simulation", json!({}), Some(Duration::from_secs(2)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(start.elapsed() <= Duration::from_millis(2010));
    // The connection survives a timed-out call.
    assert_eq!(conn.state().await, ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_bounds_retry_loop() {
    let script = Script::new();
    script.fail("get_all_tenders", TransportStatus::Unavailable, 10);
    let conn = connected(&script, 5).await;

    let start = Instant::now();
    let err = conn
        .call("get_all_tenders", json!({}), Some(Duration::from_millis(2500)))
        .await
        .unwrap_err();

    // Attempts at 0s and 1s; the sleep toward 3s is cut off.
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(script.invocations(), 2);
    assert!(start.elapsed() <= Duration::from_millis(2510));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_spaces_calls() {
    let script = Script::new();
    let mut config = service_config(ServiceRole::Simulation, 0);
    config.rate_limit = Some(2.0);
    let conn = ServiceConnection::for_role(ServiceRole::Simulation, &config, ScriptedConnector::new(&script))
        .unwrap();
    conn.connect().await.unwrap();

    // Let the health check's token refill.
    tokio::time::advance(Duration::from_secs(5)).await;

    let start = Instant::now();
    conn.call("get_simulation", json!({}), None).await.unwrap();
    conn.call("get_simulation", json!({}), None).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(10));

    conn.call("get_simulation", json!({}), None).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(500));
    assert!(start.elapsed() < Duration::from_millis(510));
}

#[tokio::test(start_paused = true)]
async fn test_call_before_connect_fails_fast() {
    let script = Script::new();
    let config = service_config(ServiceRole::Simulation, 3);
    let conn = ServiceConnection::for_role(ServiceRole::Simulation, &config, ScriptedConnector::new(&script))
        .unwrap();

    let err = conn.call("get_simulation", json!({}), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(script.invocations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_call_timeout() {
    let script = Script::new();
    let conn = connected(&script, 0).await;

    let response = conn
        .call("get_all_workers", json!({}), Some(Duration::MAX))
        .await
        .unwrap();
    assert_eq!(response["operation"], "get_all_workers");
}
