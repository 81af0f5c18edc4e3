//! Error types for outbound delivery.

use std::io::ErrorKind;

use thiserror::Error;

/// Errors reported by a [`Platform`](crate::Platform) implementation.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The platform rejected or failed to deliver the request.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The platform connection is gone, e.g. the output pipe was closed.
    #[error("platform is not connected")]
    NotConnected,
}

impl PlatformError {
    /// Creates a delivery error.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::ConnectionReset => {
                Self::NotConnected
            }
            _ => Self::Delivery(err.to_string()),
        }
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_closed_pipe_is_not_connected() {
        let err = PlatformError::from(io::Error::from(ErrorKind::BrokenPipe));
        assert!(matches!(err, PlatformError::NotConnected));

        let err = PlatformError::from(io::Error::other("disk full"));
        assert!(matches!(err, PlatformError::Delivery(msg) if msg == "disk full"));
    }
}
