use std::time::Duration;

use thiserror::Error;

/// Failure of a call to one of the remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{endpoint}: HTTP {status}")]
    Http { endpoint: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("site reported unknown status {0}")]
    InvalidStatus(i64),
}

impl RemoteError {
    /// Whether another attempt within the same cycle could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Timeout(_) | RemoteError::Transport(_) => true,
            RemoteError::Http { status, .. } => *status >= 500 || *status == 429,
            RemoteError::Malformed(_) | RemoteError::InvalidStatus(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(RemoteError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(RemoteError::Http {
            endpoint: "cons".into(),
            status: 503
        }
        .is_retryable());
        assert!(RemoteError::Http {
            endpoint: "cons".into(),
            status: 429
        }
        .is_retryable());
        assert!(!RemoteError::Http {
            endpoint: "cons".into(),
            status: 404
        }
        .is_retryable());
        assert!(!RemoteError::Malformed("eof".into()).is_retryable());
        assert!(!RemoteError::InvalidStatus(-3).is_retryable());
    }
}
