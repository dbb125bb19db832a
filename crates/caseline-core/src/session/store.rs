//! Session lifecycle management.

use super::model::{FileRef, Session, SessionId, ViewState};
use super::router::OriginToken;
use crate::error::{CaselineError, Result};

/// Owns the set of conversation sessions, the active session id, and the
/// live view.
///
/// `SessionStore` is responsible for:
/// - Creating new sessions
/// - Switching between sessions (persisting and restoring view snapshots)
/// - Deleting sessions while keeping the collection non-empty
/// - Staging files for the upload pipeline
///
/// Invariants upheld by every mutation:
/// - The session collection is never empty.
/// - `active_id` always names a session in the collection. The id is a weak
///   reference: routing code must re-check it against origin tokens at result
///   arrival time, never at dispatch time.
///
/// The store is pure state; it performs no I/O and knows nothing about
/// rendering.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// All sessions, in creation order. Order matters for delete-adjacency.
    sessions: Vec<Session>,
    /// Id of the currently active session.
    active_id: SessionId,
    /// The live view, shared by whichever session is active.
    live: ViewState,
}

impl SessionStore {
    /// Creates a store with a single fresh session, which is active.
    pub fn new() -> Self {
        let session = Session::new();
        let active_id = session.id.clone();
        Self {
            sessions: vec![session],
            active_id,
            live: ViewState::default(),
        }
    }

    /// Returns the id of the currently active session.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Captures an origin token for a network dispatch happening now.
    pub fn origin_token(&self) -> OriginToken {
        OriginToken::new(self.active_id.clone())
    }

    /// Returns all sessions in order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Returns the live view.
    pub fn live_view(&self) -> &ViewState {
        &self.live
    }

    /// Returns the live view mutably.
    pub fn live_view_mut(&mut self) -> &mut ViewState {
        &mut self.live
    }

    /// Looks up a session by id.
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Looks up a session by id, mutably.
    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Returns the active session.
    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == self.active_id)
    }

    /// Returns the active session mutably.
    pub fn active_session_mut(&mut self) -> Option<&mut Session> {
        let id = self.active_id.clone();
        self.session_mut(&id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// Copies the live view into the active session's stored snapshot.
    pub fn persist_live_view(&mut self) {
        let live = self.live.clone();
        if let Some(session) = self.active_session_mut() {
            session.view = Some(live);
        }
    }

    /// Creates a new session and makes it active.
    ///
    /// The outgoing active session's live view is persisted into its snapshot
    /// first. The new session starts with the default title, an empty view,
    /// and no pending files.
    ///
    /// Returns the new session's id.
    pub fn create_session(&mut self) -> SessionId {
        self.persist_live_view();

        let session = Session::new();
        let id = session.id.clone();
        self.sessions.push(session);
        self.active_id = id.clone();
        self.live = ViewState::default();
        tracing::debug!(session_id = %id, "created session");
        id
    }

    /// Switches the active session to `id`.
    ///
    /// A no-op if `id` is already active. Otherwise the current live view is
    /// persisted, `id` becomes active, and its stored snapshot (or an empty
    /// default) is restored into the live view.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not name a stored session.
    pub fn switch_to(&mut self, id: &str) -> Result<()> {
        if id == self.active_id {
            return Ok(());
        }
        if self.position(id).is_none() {
            return Err(CaselineError::session_not_found(id));
        }

        self.persist_live_view();
        self.active_id = id.to_string();
        self.live = self
            .session(id)
            .and_then(|s| s.view.clone())
            .unwrap_or_default();
        tracing::debug!(session_id = %id, "switched session");
        Ok(())
    }

    /// Deletes a session.
    ///
    /// If `id` names the only session, it is reset in place (title, snapshot
    /// and pending files cleared) rather than removed, so the collection
    /// never becomes empty. Otherwise the session is removed; if it was
    /// active, the session now adjacent to its former position (clamped to
    /// the new bounds) becomes active and its stored view is restored.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not name a stored session.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| CaselineError::session_not_found(id))?;

        if self.sessions.len() == 1 {
            self.sessions[pos].reset_in_place();
            self.active_id = self.sessions[pos].id.clone();
            self.live = ViewState::default();
            tracing::debug!(session_id = %id, "reset sole session in place");
            return Ok(());
        }

        let was_active = id == self.active_id;
        self.sessions.remove(pos);

        if was_active {
            let next = pos.min(self.sessions.len() - 1);
            self.active_id = self.sessions[next].id.clone();
            self.live = self.sessions[next].view.clone().unwrap_or_default();
            tracing::debug!(session_id = %self.active_id, "activated adjacent session after delete");
        }
        Ok(())
    }

    /// Attaches files to the active session, deduplicated by name.
    ///
    /// A file whose name is already pending on the session is skipped.
    pub fn attach_files(&mut self, files: Vec<FileRef>) {
        let Some(session) = self.active_session_mut() else {
            return;
        };
        for file in files {
            if session.pending_files.iter().any(|f| f.name == file.name) {
                tracing::debug!(name = %file.name, "skipping duplicate attachment");
                continue;
            }
            session.pending_files.push(file);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
