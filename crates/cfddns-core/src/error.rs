//! Error types for the cfddns system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for cfddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOp {
    /// Listing the live DNS record
    Read,
    /// Creating a missing DNS record
    Create,
    /// Updating an existing DNS record
    Update,
}

impl std::fmt::Display for ProviderOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderOp::Read => write!(f, "read"),
            ProviderOp::Create => write!(f, "create"),
            ProviderOp::Update => write!(f, "update"),
        }
    }
}

/// Core error type for the cfddns system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal, reported before any network activity)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every configured IP discovery source failed
    #[error("Unable to obtain public IP address from any source")]
    NoPublicIp,

    /// DNS provider errors (per-domain, never fatal to the run)
    #[error("Provider {op} failed for {domain}: {message}")]
    Provider {
        /// Which operation failed
        op: ProviderOp,
        /// The domain being reconciled
        domain: String,
        /// Provider or transport message
        message: String,
    },

    /// IP cache read/write errors (downgraded to warnings by the engine)
    #[error("Cache error: {0}")]
    Cache(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error for a given operation and domain
    pub fn provider(op: ProviderOp, domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            op,
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
