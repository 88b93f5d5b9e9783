//! Error handling for the acceptance harness
//!
//! Provides centralized error types using thiserror. Configuration errors
//! abort the run before any host is touched; per-host operational errors are
//! either fatal to that host's install or best-effort for log collection.

use thiserror::Error;

/// Main error type for the acceptance harness
#[derive(Error, Debug)]
pub enum HarnessError {
    /// A resolved setting value falls outside its legal set
    #[error("unsupported {description} '{value}'")]
    InvalidConfiguration { description: String, value: String },

    /// An install strategy outside the known variant set (programming defect)
    #[error("invalid install strategy: {0}")]
    UnsupportedStrategy(String),

    /// A remote-execution or file-transfer collaborator failed
    #[error("remote operation failed on {host}: {detail}")]
    RemoteOperation { host: String, detail: String },

    /// A second attempt to build the run configuration in the same process
    #[error("run configuration already built for this process")]
    ConfigAlreadyBuilt,

    /// IO errors (local filesystem, process spawning)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors (options files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

// Convenient error constructors
impl HarnessError {
    /// Create an invalid-configuration error naming the setting and value
    pub fn invalid_configuration(
        description: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            description: description.into(),
            value: value.into(),
        }
    }

    /// Create a remote-operation error for a host
    pub fn remote(host: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::RemoteOperation {
            host: host.into(),
            detail: detail.into(),
        }
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
