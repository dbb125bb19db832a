//! Caseline core domain.
//!
//! Pure state and deterministic logic for the Caseline client: the session
//! store, the response router, and the investigation result / strategy option
//! types. Nothing in this crate performs I/O; network calls and timers live in
//! `caseline-app` and `caseline-client`.
//!
//! # Module Structure
//!
//! - `error`: Shared error type (`CaselineError`)
//! - `session`: Sessions, messages, the session store and the response router
//! - `investigation`: Investigation result types, graph snapshots, and the
//!   strategy option builder

pub mod error;
pub mod investigation;
pub mod session;

pub use error::{CaselineError, Result};
