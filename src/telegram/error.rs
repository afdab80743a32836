//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn flood(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Flood, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::BadRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    /// Whether the delivery pipeline may retry this failure.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection-level failure - retryable
    Network,
    /// Request timed out - retryable
    Timeout,
    /// Rate limited (429) - retryable with backoff
    Flood,
    /// Server error (5xx) - retryable
    ServerError,
    /// Token rejected (401, 403) - not retryable
    Auth,
    /// Bad request (400) - not retryable
    BadRequest,
    /// Unknown error
    Unknown,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::Flood | Self::ServerError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(TransportError::network("x").is_retryable());
        assert!(TransportError::timeout("x").is_retryable());
        assert!(TransportError::flood("x").is_retryable());
        assert!(TransportError::server_error("x").is_retryable());
    }

    #[test]
    fn permanent_kinds_are_not_retryable() {
        assert!(!TransportError::auth("x").is_retryable());
        assert!(!TransportError::bad_request("x").is_retryable());
        assert!(!TransportError::unknown("x").is_retryable());
    }
}
