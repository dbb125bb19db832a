//! Sequential upload pipeline.
//!
//! Files are processed strictly one at a time, each completing (success or
//! failure) before the next begins. Sequencing is what guarantees that the
//! transcript matches selection order regardless of per-file latency, and it
//! bounds concurrent load on the backend.

use caseline_core::session::ChatMessage;
use crate::app::{ChatApp, error_message};

impl ChatApp {
    /// Runs the upload pipeline over the active session's pending files.
    ///
    /// Per file: a user-authored placeholder message, the upload dispatch
    /// tagged with the pipeline's origin token, routing of the result, then
    /// a fixed pause. A failed file produces an error line but does not stop
    /// the remaining files. The pending list is cleared unconditionally at
    /// the end.
    pub async fn process_pending_files(&self) {
        let (origin, files) = {
            let mut state = self.state.lock().await;
            let origin = state.store.origin_token();
            let files = state
                .store
                .active_session_mut()
                .map(|s| s.pending_files.clone())
                .unwrap_or_default();
            (origin, files)
        };
        if files.is_empty() {
            return;
        }
        tracing::info!(count = files.len(), "processing pending files");

        for file in &files {
            let placeholder = format!("[Uploaded document: {}]", file.name);
            {
                let mut state = self.state.lock().await;
                if let Some(session) = state.store.session_mut(origin.session_id()) {
                    session.set_title_once(&file.name);
                }
            }
            self.dispatch(&origin, ChatMessage::user(placeholder)).await;

            let reply = match self.client.upload(file, origin.session_id()).await {
                Ok(reply) => {
                    if reply.ready_to_investigate {
                        let mut state = self.state.lock().await;
                        state.ready_to_investigate = true;
                        drop(state);
                        self.presenter.set_investigate_enabled(true);
                        tracing::info!("investigation unlocked");
                    }
                    let mut text = reply.text;
                    if let Some(url) = reply.file_url {
                        text.push_str(&format!("\n\nDownload: {url}"));
                    }
                    ChatMessage::assistant(text)
                }
                Err(err) => {
                    tracing::warn!(name = %file.name, %err, "upload failed, continuing");
                    error_message(&err)
                }
            };
            self.deliver(&origin, reply).await;

            tokio::time::sleep(self.timing.inter_file_pause).await;
        }

        // Unconditional: failures above do not keep files queued.
        let mut state = self.state.lock().await;
        if let Some(session) = state.store.session_mut(origin.session_id()) {
            session.pending_files.clear();
        }
    }
}
