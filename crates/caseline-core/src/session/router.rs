//! Origin-token based response routing.
//!
//! A network operation is dispatched while some session is active; by the
//! time its result arrives the user may have switched or deleted sessions.
//! The router decides, using the state as observed at arrival time, whether
//! content lands in the live view, is merged into a stored snapshot, or is
//! discarded.

use super::message::ChatMessage;
use super::model::SessionId;
use super::store::SessionStore;

/// An immutable copy of the active session id, captured at the moment a
/// network operation is dispatched.
///
/// A value, not a reference: it does not keep the session alive, and routing
/// re-resolves it against the store when the result arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginToken(SessionId);

impl OriginToken {
    pub fn new(session_id: SessionId) -> Self {
        Self(session_id)
    }

    /// The session id this token was captured from.
    pub fn session_id(&self) -> &str {
        &self.0
    }
}

/// Where a routed message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// The origin session is still active: the message went into the live
    /// view and should be rendered.
    LiveView,
    /// The origin session is stored but inactive: the message was merged
    /// into its snapshot.
    MergedInto(SessionId),
    /// The origin session was deleted in the interim: the message was
    /// dropped. Lossy on deletion is the accepted policy, not an error.
    Discarded,
}

/// Routes a dispatch-time message (e.g. a user placeholder emitted by the
/// upload pipeline) and marks the target view as awaiting a reply.
pub fn route_dispatch(store: &mut SessionStore, origin: &OriginToken, message: ChatMessage) -> Routed {
    if origin.session_id() == store.active_id() {
        let view = store.live_view_mut();
        view.push(message);
        view.awaiting_reply = true;
        return Routed::LiveView;
    }

    merge_into_snapshot(store, origin, message, true)
}

/// Routes an arriving result.
///
/// Clears the target view's in-progress marker, then appends the message.
/// At most one live-view apply happens per dispatched operation because each
/// dispatch carries exactly one origin token and is routed exactly once.
pub fn route_reply(store: &mut SessionStore, origin: &OriginToken, message: ChatMessage) -> Routed {
    if origin.session_id() == store.active_id() {
        let view = store.live_view_mut();
        view.awaiting_reply = false;
        view.push(message);
        return Routed::LiveView;
    }

    merge_into_snapshot(store, origin, message, false)
}

fn merge_into_snapshot(
    store: &mut SessionStore,
    origin: &OriginToken,
    message: ChatMessage,
    awaiting_after: bool,
) -> Routed {
    match store.session_mut(origin.session_id()) {
        Some(session) => {
            let view = session.view.get_or_insert_with(Default::default);
            view.awaiting_reply = awaiting_after;
            view.push(message);
            tracing::debug!(session_id = %origin.session_id(), "merged message into stored session");
            Routed::MergedInto(origin.session_id().to_string())
        }
        None => {
            tracing::debug!(session_id = %origin.session_id(), "origin session deleted, discarding message");
            Routed::Discarded
        }
    }
}
