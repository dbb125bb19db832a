//! Session domain model.

use super::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// Unique session identifier (UUID format).
pub type SessionId = String;

/// Title given to every freshly created session until the first
/// user-authored message (or an investigation) names it.
pub const DEFAULT_SESSION_TITLE: &str = "New conversation";

/// Title applied when an investigation is started in an unnamed session.
pub const INVESTIGATION_SESSION_TITLE: &str = "Strategy investigation";

/// Maximum length (in characters) of a title derived from a message.
const TITLE_MAX_CHARS: usize = 48;

/// A file the user has attached to a session, waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Original file name, also used for deduplication.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// The rendered transcript of a conversation.
///
/// One `ViewState` is live (owned by the store, shown to the user); every
/// inactive session keeps its own copy as a snapshot. `awaiting_reply` is the
/// "in progress" marker a router merge clears before appending new content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Messages in display order.
    pub messages: Vec<ChatMessage>,
    /// Whether a dispatched operation for this view is still outstanding.
    pub awaiting_reply: bool,
}

impl ViewState {
    /// Appends a message to the transcript.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Clears the transcript and the in-progress marker.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.awaiting_reply = false;
    }
}

/// One independent, user-switchable conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Human-readable session title.
    pub title: String,
    /// Stored transcript snapshot; `None` until the session is first
    /// deactivated or receives a merged result.
    pub view: Option<ViewState>,
    /// Files attached to this session, waiting for the upload pipeline.
    pub pending_files: Vec<FileRef>,
}

impl Session {
    /// Creates a fresh session with a generated id and the default title.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            view: None,
            pending_files: Vec::new(),
        }
    }

    /// Sets the title if it is still the sentinel default.
    ///
    /// Returns `true` if the title was updated. The title is set exactly
    /// once per session lifetime; later calls are no-ops.
    pub fn set_title_once(&mut self, title: &str) -> bool {
        if self.title == DEFAULT_SESSION_TITLE {
            self.title = title.to_string();
            true
        } else {
            false
        }
    }

    /// Resets the session to its freshly-created state, keeping the id.
    ///
    /// Used when the sole remaining session is "deleted": the collection must
    /// never become empty, so the session is recycled in place.
    pub fn reset_in_place(&mut self) {
        self.title = DEFAULT_SESSION_TITLE.to_string();
        self.view = None;
        self.pending_files.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a session title from the first user-authored message.
///
/// Whitespace is collapsed and the result is truncated on a character
/// boundary.
pub fn title_from_message(message: &str) -> String {
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}…", truncated.trim_end())
}
