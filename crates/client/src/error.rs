//! Unified error handling for the client.
//!
//! Each boundary owns its error type (`RemoteError` in the gateway,
//! `PersistenceError` in the local store, `ConfigError` in configuration);
//! `StoreError` unifies them for callers that drive whole flows such as the
//! cart store. Expected failure modes never panic across a public contract.

use thiserror::Error;

use crate::config::ConfigError;
use crate::gateway::RemoteError;
use crate::persistence::PersistenceError;

/// Top-level error type for client operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Remote backend operation failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Local persistence failed in a way that could not be degraded.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed input at a form boundary.
    ///
    /// Constructed by presentation-side validation, never inside the core
    /// components; carried here so flows have a single error channel.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
