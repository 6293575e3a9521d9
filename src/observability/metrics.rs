//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_calls_total` (counter): logical calls by service, operation, outcome
//! - `client_call_duration_seconds` (histogram): end-to-end call latency
//! - `client_retries_total` (counter): retry attempts by service, operation
//! - `client_rate_limit_wait_seconds` (histogram): admission delays
//! - `client_service_health` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::Instant;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one logical call.
pub fn record_call(service: &str, operation: &str, outcome: &str, start: Instant) {
    let labels = [
        ("service", service.to_string()),
        ("operation", operation.to_string()),
        ("outcome", outcome.to_string()),
    ];
    metrics::counter!("client_calls_total", &labels).increment(1);
    metrics::histogram!("client_call_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(service: &str, operation: &str) {
    metrics::counter!(
        "client_retries_total",
        "service" => service.to_string(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

pub fn record_rate_limit_wait(wait: Duration) {
    metrics::histogram!("client_rate_limit_wait_seconds").record(wait.as_secs_f64());
}

pub fn record_service_health(service: &str, healthy: bool) {
    metrics::gauge!("client_service_health", "service" => service.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
