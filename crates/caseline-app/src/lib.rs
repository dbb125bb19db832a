//! Caseline orchestration layer.
//!
//! Drives the asynchronous flows of the client on top of the pure state in
//! `caseline-core` and the HTTP calls in `caseline-client`:
//!
//! - chat dispatch and session commands ([`app::ChatApp`])
//! - the sequential upload pipeline (`upload`)
//! - the investigation orchestrator (`investigation`)
//!
//! Rendering is behind the [`presenter::Presenter`] trait, so every state
//! machine here is testable without a view.

pub mod app;
pub mod investigation;
pub mod presenter;
pub mod upload;

pub use app::{ChatApp, Timing};
pub use investigation::{InvestigationPhase, InvestigationStep};
pub use presenter::Presenter;

#[cfg(test)]
pub(crate) mod test_support;
