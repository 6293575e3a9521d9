//! Transport status → error kind mapping.
//!
//! This table is the only place a status code is interpreted.

use crate::errors::kinds::{ClientError, ErrorKind};
use crate::errors::status::{TransportError, TransportStatus};

/// Classify a transport failure.
pub fn classify(err: &TransportError) -> ErrorKind {
    match err.status {
        TransportStatus::NotFound => ErrorKind::NotFound,
        TransportStatus::Unauthenticated | TransportStatus::PermissionDenied => {
            ErrorKind::Authentication
        }
        TransportStatus::ResourceExhausted => ErrorKind::ResourceExhausted,
        TransportStatus::InvalidArgument | TransportStatus::FailedPrecondition => {
            ErrorKind::Validation
        }
        TransportStatus::Unavailable => ErrorKind::Connection,
        TransportStatus::DeadlineExceeded => ErrorKind::Timeout,
        TransportStatus::Other(_) if err.transient => ErrorKind::Retryable,
        TransportStatus::Other(_) => ErrorKind::Unknown,
    }
}

/// Conversion of an operation failure into a classified error.
///
/// Implemented for raw transport failures (through [`classify`]) and for
/// errors that are already classified.
pub trait Classify {
    fn into_client_error(self, operation: &str) -> ClientError;
}

impl Classify for TransportError {
    fn into_client_error(self, operation: &str) -> ClientError {
        let kind = classify(&self);
        let err = ClientError::new(kind, format!("{} failed: {}", operation, self.message));
        match self.details {
            Some(details) => err.with_details(details),
            None => err,
        }
    }
}

impl Classify for ClientError {
    fn into_client_error(self, _operation: &str) -> ClientError {
        self
    }
}
