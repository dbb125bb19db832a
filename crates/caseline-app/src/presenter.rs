//! Presentation seam.
//!
//! The orchestration layer never renders anything itself; it narrates what
//! happened through this trait. A real frontend draws messages and graphs,
//! the test suite records the calls.

use caseline_core::investigation::StrategyOption;
use caseline_core::session::{ChatMessage, ViewState};
use crate::investigation::InvestigationStep;

/// Rendering side effects the orchestration layer can trigger.
///
/// Implementations must be cheap and non-blocking; they are called from
/// async tasks between suspension points.
pub trait Presenter: Send + Sync {
    /// A message was appended to the live view.
    fn append_message(&self, message: &ChatMessage);

    /// The live view was replaced wholesale (session switch, delete, or
    /// investigation reset).
    fn replace_view(&self, view: &ViewState);

    /// The "assistant is working" indicator for the live view.
    fn set_awaiting_reply(&self, awaiting: bool);

    /// Whether the chat input accepts text.
    fn set_input_enabled(&self, enabled: bool);

    /// Whether the investigation trigger is offered.
    fn set_investigate_enabled(&self, enabled: bool);

    /// A scripted investigation step started, with its narrative lines.
    fn show_investigation_step(&self, step: InvestigationStep, lines: &[String]);

    /// The investigation finished; render the ranked options.
    fn render_strategy_options(&self, options: &[StrategyOption]);

    /// The investigation failed; render the dedicated inline failure.
    fn show_investigation_failure(&self, detail: &str);

    /// A report was accepted and produced a mailto link.
    fn show_report_link(&self, mailto_url: &str);
}
