//! Error types for the authorization context

use thiserror::Error;

/// Authorization errors
///
/// Ordinary denials (bad identifiers, missing privileges, rejected tokens) are
/// never errors. Only infrastructure and configuration failures end up here.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Permission or role store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Shared cache failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token signing or verification error
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
