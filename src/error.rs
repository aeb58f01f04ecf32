//! Error types for the conformance suite

use std::time::Duration;

use thiserror::Error;

/// Result alias used across the suite
pub type SuiteResult<T> = Result<T, SuiteError>;

/// Rejected test-dimension values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("wrong parameter: unsupported MTU {0}")]
    InvalidMtu(u32),

    #[error("wrong parameter: unsupported connectivity '{0}'")]
    InvalidConnectivity(String),

    #[error("wrong parameter: unsupported protocol '{0}'")]
    InvalidProtocol(String),
}

/// Suite-level error
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("SR-IOV discovery failed: {0}")]
    Discovery(String),

    #[error("pod {pod} ended in phase {phase}")]
    PodFailed { pod: String, phase: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SuiteError {
    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn timeout(what: &str, timeout: Duration) -> Self {
        Self::Timeout {
            what: what.to_string(),
            timeout,
        }
    }

    /// Whether this is a bounded wait that ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_messages() {
        assert_eq!(
            ParameterError::InvalidMtu(1234).to_string(),
            "wrong parameter: unsupported MTU 1234"
        );
        let err: SuiteError = ParameterError::InvalidProtocol("gre".to_string()).into();
        assert_eq!(err.to_string(), "wrong parameter: unsupported protocol 'gre'");
    }

    #[test]
    fn test_timeout_error() {
        let err = SuiteError::timeout("pod testpod-abc to be Running", Duration::from_secs(180));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("pod testpod-abc to be Running"));
    }
}
