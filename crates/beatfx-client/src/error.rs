//! Transport error types.

use std::fmt;
use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service could not be reached at all
    Unreachable,
    /// The service answered and refused the request
    ServerRejected,
    /// The job id means nothing to the service
    NotFound,
    /// Anything that fits none of the above
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::ServerRejected => "server_rejected",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform failure for every remote operation.
///
/// Each variant carries a human-readable detail string suitable for showing
/// to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("service rejected the request: {0}")]
    ServerRejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Unknown(String),
}

impl TransportError {
    /// Classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Unreachable(_) => ErrorKind::Unreachable,
            TransportError::ServerRejected(_) => ErrorKind::ServerRejected,
            TransportError::NotFound(_) => ErrorKind::NotFound,
            TransportError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The detail string carried by the variant.
    pub fn detail(&self) -> &str {
        match self {
            TransportError::Unreachable(s)
            | TransportError::ServerRejected(s)
            | TransportError::NotFound(s)
            | TransportError::Unknown(s) => s,
        }
    }

    /// Normalize a reqwest failure: timeouts and connect failures mean the
    /// service is unreachable, everything else is unclassified.
    pub(crate) fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            TransportError::Unreachable(e.to_string())
        } else {
            TransportError::Unknown(e.to_string())
        }
    }
}
