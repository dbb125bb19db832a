//! Error types for the Caseline client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the core domain layer.
///
/// This provides typed, structured error variants for state operations;
/// network-level errors have their own type in `caseline-client`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaselineError {
    /// A session id did not match any stored session.
    #[error("Session not found: '{0}'")]
    SessionNotFound(String),

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CaselineError {
    /// Creates a SessionNotFound error.
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound(id.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, CaselineError>;
