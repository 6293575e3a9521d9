//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports set, delays ordered)
//! - Check the host forms a valid endpoint URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the config

use thiserror::Error;
use url::Url;

use crate::config::schema::{ClientConfig, ServiceConfig};

/// A single semantic violation, tagged with the offending field path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate the whole client configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(service_errors("simulation", &config.simulation));
    errors.extend(service_errors("data", &config.data));

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one service section; `prefix` names it in error paths.
pub fn validate_service(prefix: &str, config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let errors = service_errors(prefix, config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn service_errors(prefix: &str, config: &ServiceConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let field = |name: &str| format!("{prefix}.{name}");

    if config.host.trim().is_empty() {
        errors.push(ValidationError::new(field("host"), "must not be empty"));
    }

    match config.port {
        None => errors.push(ValidationError::new(field("port"), "must be set")),
        Some(0) => errors.push(ValidationError::new(field("port"), "must be non-zero")),
        Some(_) => {
            if let Some(uri) = config.uri() {
                if let Err(e) = Url::parse(&uri) {
                    errors.push(ValidationError::new(
                        field("host"),
                        format!("'{}' does not form a valid endpoint: {}", config.host, e),
                    ));
                }
            }
        }
    }

    if !config.timeout_secs.is_finite() || config.timeout_secs <= 0.0 {
        errors.push(ValidationError::new(
            field("timeout_secs"),
            format!("must be a positive number of seconds, got {}", config.timeout_secs),
        ));
    }

    if let Some(rate) = config.rate_limit {
        if !rate.is_finite() || rate <= 0.0 {
            errors.push(ValidationError::new(
                field("rate_limit"),
                format!("must be a positive requests-per-second value, got {rate}"),
            ));
        }
    }

    if config.backoff.base_delay_ms == 0 {
        errors.push(ValidationError::new(field("backoff.base_delay_ms"), "must be non-zero"));
    }
    if config.backoff.max_delay_ms < config.backoff.base_delay_ms {
        errors.push(ValidationError::new(
            field("backoff.max_delay_ms"),
            "must not be smaller than base_delay_ms",
        ));
    }

    errors
}
