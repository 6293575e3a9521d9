//! Transport-level failure as reported by a remote stub.

use serde_json::Value;
use tonic::Code;

/// Status vocabulary understood by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportStatus {
    NotFound,
    Unauthenticated,
    PermissionDenied,
    ResourceExhausted,
    InvalidArgument,
    FailedPrecondition,
    /// Endpoint unavailable, including connection-level failures.
    Unavailable,
    DeadlineExceeded,
    /// Any other status, by numeric gRPC code.
    Other(i32),
}

impl From<Code> for TransportStatus {
    fn from(code: Code) -> Self {
        match code {
            Code::NotFound => TransportStatus::NotFound,
            Code::Unauthenticated => TransportStatus::Unauthenticated,
            Code::PermissionDenied => TransportStatus::PermissionDenied,
            Code::ResourceExhausted => TransportStatus::ResourceExhausted,
            Code::InvalidArgument => TransportStatus::InvalidArgument,
            Code::FailedPrecondition => TransportStatus::FailedPrecondition,
            Code::Unavailable => TransportStatus::Unavailable,
            Code::DeadlineExceeded => TransportStatus::DeadlineExceeded,
            other => TransportStatus::Other(other as i32),
        }
    }
}

impl std::fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportStatus::NotFound => f.write_str("NOT_FOUND"),
            TransportStatus::Unauthenticated => f.write_str("UNAUTHENTICATED"),
            TransportStatus::PermissionDenied => f.write_str("PERMISSION_DENIED"),
            TransportStatus::ResourceExhausted => f.write_str("RESOURCE_EXHAUSTED"),
            TransportStatus::InvalidArgument => f.write_str("INVALID_ARGUMENT"),
            TransportStatus::FailedPrecondition => f.write_str("FAILED_PRECONDITION"),
            TransportStatus::Unavailable => f.write_str("UNAVAILABLE"),
            TransportStatus::DeadlineExceeded => f.write_str("DEADLINE_EXCEEDED"),
            TransportStatus::Other(code) => write!(f, "STATUS_{}", code),
        }
    }
}

/// A failed remote call: status, details text and an optional transient hint.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub status: TransportStatus,
    pub message: String,
    /// Set when the transport knows the failure is safe to retry.
    pub transient: bool,
    pub details: Option<Value>,
}

impl TransportError {
    pub fn new(status: TransportStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            transient: false,
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TransportStatus::Unavailable, message)
    }

    /// Mark this failure as transient.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        Self::new(status.code().into(), status.message())
    }
}

impl From<tonic::transport::Error> for TransportError {
    fn from(err: tonic::transport::Error) -> Self {
        Self::unavailable(err.to_string())
    }
}
