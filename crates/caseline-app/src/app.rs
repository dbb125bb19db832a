//! Application core: shared state, chat dispatch, and session commands.

use caseline_client::{BackendClient, BackendError, ReportRequest};
use caseline_core::Result;
use caseline_core::session::{
    ChatMessage, FileRef, OriginToken, Routed, SessionId, SessionStore, route_dispatch,
    route_reply, title_from_message,
};
use crate::investigation::InvestigationPhase;
use crate::presenter::Presenter;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Pacing knobs for the upload pipeline and the investigation narrative.
///
/// Defaults match the production choreography; tests shrink them to
/// milliseconds.
#[derive(Debug, Clone)]
pub struct Timing {
    /// How long the graph fetch may race before synthetic data wins.
    pub graph_timeout: Duration,
    /// Minimum elapsed time for the initializing phase, even when the graph
    /// fetch resolves immediately.
    pub min_init: Duration,
    /// Base duration of each scripted step.
    pub step_base: [Duration; 4],
    /// Pace multiplier applied to every step.
    pub pace: f64,
    /// Jitter fraction (± of the paced duration).
    pub jitter: f64,
    /// Floor for a jittered step; steps never collapse to zero.
    pub step_floor: Duration,
    /// Grace window for reading the computation result at the final step.
    pub result_grace: Duration,
    /// Fixed pause between files in the upload pipeline.
    pub inter_file_pause: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            graph_timeout: Duration::from_secs(4),
            min_init: Duration::from_millis(1500),
            step_base: [
                Duration::from_millis(1600),
                Duration::from_millis(2000),
                Duration::from_millis(2200),
                Duration::from_millis(1800),
            ],
            pace: 1.0,
            jitter: 0.2,
            step_floor: Duration::from_millis(500),
            result_grace: Duration::from_millis(100),
            inter_file_pause: Duration::from_millis(500),
        }
    }
}

impl Timing {
    /// Jittered delay for scripted step `index`:
    /// `base × pace ± jitter`, floor-clamped.
    pub fn step_delay(&self, index: usize) -> Duration {
        let base = self.step_base[index.min(self.step_base.len() - 1)];
        let spread = rand::thread_rng().gen_range(-1.0..=1.0) * self.jitter;
        let delay = base.mul_f64((self.pace * (1.0 + spread)).max(0.0));
        delay.max(self.step_floor)
    }
}

/// Mutable application state behind the single lock.
///
/// Everything here is only touched between suspension points while the lock
/// is held, which is the whole concurrency model: cooperative interleaving,
/// no mutation races within a synchronous segment.
pub(crate) struct AppState {
    pub store: SessionStore,
    /// Sticky capability flag: an upload signalled readiness and no
    /// investigation has consumed it yet.
    pub ready_to_investigate: bool,
    /// Reentrancy guard; exactly one investigation may be in flight.
    pub investigation_running: bool,
    /// Last observed orchestrator phase, for introspection.
    pub investigation_phase: InvestigationPhase,
}

impl AppState {
    fn new() -> Self {
        Self {
            store: SessionStore::new(),
            ready_to_investigate: false,
            investigation_running: false,
            investigation_phase: InvestigationPhase::Idle,
        }
    }
}

/// The client application: session commands, chat dispatch, uploads,
/// investigations, and report sending.
///
/// Cheap to clone; clones share the same state, backend and presenter.
#[derive(Clone)]
pub struct ChatApp {
    pub(crate) state: Arc<Mutex<AppState>>,
    pub(crate) client: Arc<dyn BackendClient>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) timing: Timing,
}

impl ChatApp {
    /// Creates an app with one fresh session and default pacing.
    pub fn new(client: Arc<dyn BackendClient>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new())),
            client,
            presenter,
            timing: Timing::default(),
        }
    }

    /// Overrides the pacing configuration.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Returns the id of the currently active session.
    pub async fn active_session_id(&self) -> SessionId {
        self.state.lock().await.store.active_id().to_string()
    }

    /// Returns a point-in-time copy of the session store.
    pub async fn store_snapshot(&self) -> SessionStore {
        self.state.lock().await.store.clone()
    }

    /// Whether an upload has unlocked the investigation feature.
    pub async fn ready_to_investigate(&self) -> bool {
        self.state.lock().await.ready_to_investigate
    }

    /// Sends one chat turn and routes the eventual reply.
    ///
    /// The origin token is captured at dispatch; the reply lands wherever
    /// that session is when it arrives.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let origin = {
            let mut state = self.state.lock().await;
            if let Some(session) = state.store.active_session_mut() {
                session.set_title_once(&title_from_message(text));
            }
            state.store.origin_token()
        };
        self.dispatch(&origin, ChatMessage::user(text)).await;

        let result = self.client.chat(text, origin.session_id()).await;
        let reply = match result {
            Ok(reply) => ChatMessage::assistant(reply.text),
            Err(err) => error_message(&err),
        };
        self.deliver(&origin, reply).await;
    }

    /// Creates a new session and makes it active.
    pub async fn create_session(&self) -> SessionId {
        let (id, view) = {
            let mut state = self.state.lock().await;
            let id = state.store.create_session();
            (id, state.store.live_view().clone())
        };
        self.presenter.replace_view(&view);
        self.presenter.set_awaiting_reply(false);
        id
    }

    /// Switches the active session and restores its stored view.
    pub async fn switch_session(&self, id: &str) -> Result<()> {
        let view = {
            let mut state = self.state.lock().await;
            state.store.switch_to(id)?;
            state.store.live_view().clone()
        };
        self.presenter.set_awaiting_reply(view.awaiting_reply);
        self.presenter.replace_view(&view);
        Ok(())
    }

    /// Deletes a session and fires a best-effort backend reset for it.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let view = {
            let mut state = self.state.lock().await;
            state.store.delete_session(id)?;
            state.store.live_view().clone()
        };
        self.presenter.set_awaiting_reply(view.awaiting_reply);
        self.presenter.replace_view(&view);

        // Best-effort: the backend forgetting the thread is nice to have,
        // never required.
        let client = Arc::clone(&self.client);
        let session_id = id.to_string();
        tokio::spawn(async move {
            if let Err(err) = client.reset_session(&session_id).await {
                tracing::warn!(session_id, %err, "backend session reset failed");
            }
        });
        Ok(())
    }

    /// Attaches files to the active session, deduplicated by name.
    pub async fn attach_files(&self, files: Vec<FileRef>) {
        self.state.lock().await.store.attach_files(files);
    }

    /// Sends a strategy report and surfaces the mailto link, if any.
    pub async fn send_report(&self, email: &str, strategy_index: usize, report_summary: &str) {
        let origin = self.state.lock().await.store.origin_token();
        let request = ReportRequest {
            email: email.to_string(),
            strategy_index,
            report_summary: report_summary.to_string(),
        };
        match self.client.send_report(&request).await {
            Ok(reply) => {
                if let Some(url) = reply.mailto_url {
                    self.presenter.show_report_link(&url);
                }
            }
            Err(err) => self.deliver(&origin, error_message(&err)).await,
        }
    }

    /// Routes a dispatch-time message and mirrors it to the presenter when
    /// it hits the live view.
    pub(crate) async fn dispatch(&self, origin: &OriginToken, message: ChatMessage) {
        let routed = {
            let mut state = self.state.lock().await;
            route_dispatch(&mut state.store, origin, message.clone())
        };
        if routed == Routed::LiveView {
            self.presenter.append_message(&message);
            self.presenter.set_awaiting_reply(true);
        }
    }

    /// Routes an arriving result and mirrors it to the presenter when it
    /// hits the live view.
    pub(crate) async fn deliver(&self, origin: &OriginToken, message: ChatMessage) {
        let routed = {
            let mut state = self.state.lock().await;
            route_reply(&mut state.store, origin, message.clone())
        };
        match routed {
            Routed::LiveView => {
                self.presenter.set_awaiting_reply(false);
                self.presenter.append_message(&message);
            }
            Routed::MergedInto(id) => {
                tracing::debug!(session_id = %id, "reply merged into inactive session");
            }
            Routed::Discarded => {
                tracing::debug!("reply discarded; origin session gone");
            }
        }
    }
}

/// Maps a backend error to its user-visible chat line.
pub(crate) fn error_message(err: &BackendError) -> ChatMessage {
    match err {
        BackendError::Transport(detail) => {
            ChatMessage::assistant(format!("Connection error: {detail}"))
        }
        BackendError::Api(detail) | BackendError::Decode(detail) => {
            ChatMessage::assistant(format!("Error: {detail}"))
        }
    }
}
