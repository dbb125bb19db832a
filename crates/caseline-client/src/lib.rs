//! HTTP client for the Caseline backend.
//!
//! The six backend calls the core consumes, behind the [`BackendClient`]
//! trait so the orchestration layer can be tested against mocks. The real
//! implementation talks JSON (and multipart for uploads) over HTTP with
//! reqwest.
//!
//! Configuration priority for the base URL: explicit constructor argument,
//! then the `CASELINE_BASE_URL` environment variable, then a localhost
//! default.

mod dto;
mod error;

pub use dto::{ChatReply, GraphReply, ReportReply, UploadReply};
pub use error::BackendError;

use async_trait::async_trait;
use caseline_core::investigation::InvestigationResult;
use caseline_core::session::FileRef;
use dto::{ChatResponse, Envelope, GraphResponse, ReportResponse, UploadResponse};
use reqwest::Client;
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5001";

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const RESET_TIMEOUT: Duration = Duration::from_secs(10);
const INVESTIGATION_TIMEOUT: Duration = Duration::from_secs(300);
const GRAPH_TIMEOUT: Duration = Duration::from_secs(30);
const REPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// A report submission request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReportRequest {
    pub email: String,
    pub strategy_index: usize,
    pub report_summary: String,
}

/// The backend calls the client depends on.
///
/// Every call is attempted exactly once; there are no retries anywhere in
/// the client.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// One chat turn.
    async fn chat(&self, message: &str, session_id: &str) -> Result<ChatReply, BackendError>;

    /// Uploads a single file for processing.
    async fn upload(&self, file: &FileRef, session_id: &str) -> Result<UploadReply, BackendError>;

    /// Resets backend-side session state. Best-effort; callers ignore
    /// failures.
    async fn reset_session(&self, session_id: &str) -> Result<(), BackendError>;

    /// Runs the strategy computation for a session's documents.
    async fn start_investigation(
        &self,
        session_id: &str,
    ) -> Result<InvestigationResult, BackendError>;

    /// Fetches the supporting similarity-graph snapshot.
    async fn fetch_graph(&self, session_id: &str) -> Result<GraphReply, BackendError>;

    /// Submits a strategy report for delivery.
    async fn send_report(&self, request: &ReportRequest) -> Result<ReportReply, BackendError>;
}

/// Reqwest-backed [`BackendClient`] implementation.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: String,
}

impl HttpBackendClient {
    /// Creates a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client from `CASELINE_BASE_URL`, falling back to
    /// `http://localhost:5001`.
    pub fn from_env() -> Self {
        let base_url = env::var("CASELINE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks the HTTP status and decodes the body as `T`.
    ///
    /// Error-status bodies are still JSON on this backend; their `error`
    /// field is preferred over a bare status line.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("backend returned {status}"));
            return Err(BackendError::Api(detail));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn chat(&self, message: &str, session_id: &str) -> Result<ChatReply, BackendError> {
        tracing::debug!(session_id, "dispatching chat turn");
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&serde_json::json!({ "message": message, "session_id": session_id }))
            .timeout(CHAT_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        dto::chat_reply(Self::decode::<ChatResponse>(response).await?)
    }

    async fn upload(&self, file: &FileRef, session_id: &str) -> Result<UploadReply, BackendError> {
        tracing::debug!(session_id, name = %file.name, size = file.bytes.len(), "uploading file");
        let part = reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("session_id", session_id.to_string());
        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        dto::upload_reply(Self::decode::<UploadResponse>(response).await?)
    }

    async fn reset_session(&self, session_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/reset"))
            .json(&serde_json::json!({ "session_id": session_id }))
            .timeout(RESET_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        // Body is ignored; only transport/status matter for logging.
        if !response.status().is_success() {
            return Err(BackendError::Api(format!(
                "reset returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn start_investigation(
        &self,
        session_id: &str,
    ) -> Result<InvestigationResult, BackendError> {
        tracing::info!(session_id, "starting investigation computation");
        let response = self
            .client
            .post(self.url("/api/investigation/start"))
            .json(&serde_json::json!({ "session_id": session_id }))
            .timeout(INVESTIGATION_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        let envelope = Self::decode::<Envelope<InvestigationResult>>(response).await?;
        dto::envelope_data(envelope, "investigation")
    }

    async fn fetch_graph(&self, session_id: &str) -> Result<GraphReply, BackendError> {
        tracing::debug!(session_id, "fetching graph snapshot");
        let response = self
            .client
            .post(self.url("/api/investigation/graph"))
            .json(&serde_json::json!({ "session_id": session_id }))
            .timeout(GRAPH_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        dto::graph_reply(Self::decode::<GraphResponse>(response).await?)
    }

    async fn send_report(&self, request: &ReportRequest) -> Result<ReportReply, BackendError> {
        tracing::debug!(strategy_index = request.strategy_index, "sending report");
        let response = self
            .client
            .post(self.url("/api/report"))
            .json(request)
            .timeout(REPORT_TIMEOUT)
            .send()
            .await
            .map_err(BackendError::from)?;
        let resp = Self::decode::<ReportResponse>(response).await?;
        Ok(ReportReply {
            mailto_url: resp.mailto_url,
        })
    }
}
