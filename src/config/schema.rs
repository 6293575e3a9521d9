//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::connection::roles::ServiceRole;

/// Root configuration for the two-service client.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Simulation service connection.
    pub simulation: ServiceConfig,

    /// Data-management service connection.
    pub data: ServiceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Fill unset ports with the default port of each service role.
    pub fn with_role_defaults(mut self) -> Self {
        self.simulation
            .port
            .get_or_insert(ServiceRole::Simulation.default_port());
        self.data
            .port
            .get_or_insert(ServiceRole::DataManagement.default_port());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            simulation: ServiceConfig::for_role(ServiceRole::Simulation),
            data: ServiceConfig::for_role(ServiceRole::DataManagement),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Settings for one service connection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Server host name or address.
    pub host: String,

    /// Server port. Unset ports take the role default when loaded.
    pub port: Option<u16>,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Default per-call timeout in seconds.
    pub timeout_secs: f64,

    /// Optional requests-per-second cap for this connection.
    pub rate_limit: Option<f64>,

    /// Emit lifecycle and retry log events for this connection.
    pub enable_logging: bool,

    /// Retry delay schedule.
    pub backoff: BackoffConfig,

    /// Transport channel options.
    pub channel: ChannelConfig,
}

impl ServiceConfig {
    /// Defaults for a known service role.
    pub fn for_role(role: ServiceRole) -> Self {
        Self {
            port: Some(role.default_port()),
            ..Self::default()
        }
    }

    /// Endpoint URI for the transport (`http://host:port`), once a port is set.
    pub fn uri(&self) -> Option<String> {
        self.port.map(|port| format!("http://{}:{}", self.host, port))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            max_retries: 3,
            timeout_secs: 30.0,
            rate_limit: None,
            enable_logging: true,
            backoff: BackoffConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

/// Exponential backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first failed attempt in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds.
    pub max_delay_ms: u64,

    /// Scale each delay by a random factor in [0.5, 1.0).
    pub jitter: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter: true,
        }
    }
}

/// Transport channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    /// HTTP/2 keepalive ping interval in milliseconds.
    pub keepalive_interval_ms: u64,

    /// Keepalive ping acknowledgement timeout in milliseconds.
    pub keepalive_timeout_ms: u64,

    /// Send keepalive pings even without in-flight calls.
    pub keepalive_while_idle: bool,

    /// Optional connection establishment timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            keepalive_interval_ms: 10_000,
            keepalive_timeout_ms: 5_000,
            keepalive_while_idle: true,
            connect_timeout_ms: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
