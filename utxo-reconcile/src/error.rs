use thiserror::Error;

/// Failure of a single chain source. Propagated unchanged to the caller, a
/// source never returns a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Transport level failure: connection refused, timeout, non-success status
    /// or an error reply from the node.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// A response arrived but did not match the expected schema.
    #[error("Source protocol error: {0}")]
    Protocol(String),

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    /// Construction time configuration was rejected.
    #[error("Invalid source configuration: {0}")]
    Config(String),
}

impl SourceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!("{}", msg);
        SourceError::Unavailable(msg)
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!("{}", msg);
        SourceError::Protocol(msg)
    }

    pub fn unsupported_asset(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!("{}", msg);
        SourceError::UnsupportedAsset(msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!("{}", msg);
        SourceError::Config(msg)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::protocol(format!("Failed to decode response: {}", e))
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Source {name} failed: {error}")]
    Source { name: String, error: SourceError },

    #[error("Task for source {name} did not complete: {message}")]
    Join { name: String, message: String },
}
