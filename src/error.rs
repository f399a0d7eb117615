use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PtslError>;

/// Failures inside the client. None of these cross the dispatch boundary:
/// the dispatcher folds every one of them into a `CommandResponse`.
#[derive(Error, Debug)]
pub enum PtslError {
    #[error("gRPC call failed: {0}")]
    Transport(#[from] tonic::Status),

    #[error("Failed to connect to PTSL server: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("Invalid server endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Host is not ready to accept '{0}'; run HostReadyCheck first")]
    HostNotReady(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("Stream closed before any response was received")]
    EmptyStream,

    #[error("Task status polling failed: {0}")]
    Poller(String),

    #[error("Task status poller panicked: {0}")]
    PollerPanicked(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PtslError {
    /// Failures decided locally, before anything was sent to the host.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PtslError::HostNotReady(_) | PtslError::PermissionDenied(_)
        )
    }
}

impl From<tokio::task::JoinError> for PtslError {
    fn from(err: tokio::task::JoinError) -> Self {
        PtslError::PollerPanicked(err.to_string())
    }
}
