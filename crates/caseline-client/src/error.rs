//! Backend error taxonomy.

use thiserror::Error;

/// Errors from a backend call.
///
/// The split matters to callers: transport failures are surfaced to the user
/// as connection errors, application errors carry the backend's own `error`
/// string, and decode errors indicate a payload the client could not read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Network/connection failure; the request may never have reached the
    /// backend.
    #[error("connection error: {0}")]
    Transport(String),

    /// The backend answered but reported an application error.
    #[error("{0}")]
    Api(String),

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// The bare detail string, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Transport(d) | Self::Api(d) | Self::Decode(d) => d,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
