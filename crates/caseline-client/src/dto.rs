//! Wire payloads and the replies handed to callers.
//!
//! Raw `*Response` types mirror the backend JSON exactly; `*Reply` types are
//! what the client returns after envelope handling. Keeping the conversion as
//! plain functions makes the error taxonomy testable without a server.

use crate::error::BackendError;
use caseline_core::investigation::{CaseProfile, GraphSnapshot};
use serde::Deserialize;

/// Raw `/api/chat` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Raw `/api/upload` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready_to_investigate: Option<bool>,
    /// Backend lifecycle state string, an alternative readiness signal.
    #[serde(default)]
    pub state: Option<String>,
}

/// Generic `success`/`data`/`error` envelope used by the investigation
/// endpoints.
///
/// `data` carries no `default` attribute: the derive would infer a
/// `T: Default` bound from it, and a missing `Option` field already decodes
/// as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Raw `/api/investigation/graph` response body.
///
/// `profile` rides alongside the envelope rather than inside `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<GraphSnapshot>,
    #[serde(default)]
    pub profile: Option<CaseProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Raw `/api/report` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub mailto_url: Option<String>,
}

/// A successful chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}

/// A successful file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub text: String,
    pub file_url: Option<String>,
    /// Whether this upload unlocked the investigation feature.
    pub ready_to_investigate: bool,
}

/// A successful graph fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphReply {
    pub snapshot: GraphSnapshot,
    pub profile: Option<CaseProfile>,
}

/// A successful report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReply {
    pub mailto_url: Option<String>,
}

/// Lifecycle state string that also signals investigation readiness.
const READY_STATE: &str = "ready_to_investigate";

pub(crate) fn chat_reply(resp: ChatResponse) -> Result<ChatReply, BackendError> {
    if let Some(error) = resp.error {
        return Err(BackendError::Api(error));
    }
    match resp.response {
        Some(text) => Ok(ChatReply { text }),
        None => Err(BackendError::Decode("chat response missing body".to_string())),
    }
}

pub(crate) fn upload_reply(resp: UploadResponse) -> Result<UploadReply, BackendError> {
    if let Some(error) = resp.error {
        return Err(BackendError::Api(error));
    }
    let ready = resp.ready_to_investigate.unwrap_or(false)
        || resp.state.as_deref() == Some(READY_STATE);
    match resp.response {
        Some(text) => Ok(UploadReply {
            text,
            file_url: resp.file_url,
            ready_to_investigate: ready,
        }),
        None => Err(BackendError::Decode("upload response missing body".to_string())),
    }
}

pub(crate) fn envelope_data<T>(envelope: Envelope<T>, what: &str) -> Result<T, BackendError> {
    if let Some(error) = envelope.error {
        return Err(BackendError::Api(error));
    }
    if !envelope.success {
        return Err(BackendError::Api(format!("{what} failed")));
    }
    envelope
        .data
        .ok_or_else(|| BackendError::Decode(format!("{what} response missing data")))
}

pub(crate) fn graph_reply(resp: GraphResponse) -> Result<GraphReply, BackendError> {
    if let Some(error) = resp.error {
        return Err(BackendError::Api(error));
    }
    if !resp.success {
        return Err(BackendError::Api("graph fetch failed".to_string()));
    }
    match resp.data {
        Some(snapshot) => Ok(GraphReply {
            snapshot,
            profile: resp.profile,
        }),
        None => Err(BackendError::Decode("graph response missing data".to_string())),
    }
}
