//! Session domain module.
//!
//! Everything the client knows about conversation threads: the session model,
//! chat messages, the session store (which owns the live view and the active
//! session id), and the response router that places arriving results.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `ViewState`, `FileRef`)
//! - `message`: Conversation message types (`MessageRole`, `ChatMessage`)
//! - `store`: Session lifecycle management (`SessionStore`)
//! - `router`: Origin-token based response routing

mod message;
mod model;
mod router;
mod store;

pub use message::{ChatMessage, MessageRole};
pub use model::{
    DEFAULT_SESSION_TITLE, FileRef, INVESTIGATION_SESSION_TITLE, Session, SessionId, ViewState,
    title_from_message,
};
pub use router::{OriginToken, Routed, route_dispatch, route_reply};
pub use store::SessionStore;
