//! Investigation orchestrator.
//!
//! Runs the scripted four-step narrative while the real computation executes
//! in the background, then reconciles whichever data arrived into a single
//! presentation. Two timing pressures are balanced here:
//!
//! - the graph fetch is raced against a timeout, but the initializing phase
//!   also enforces a minimum elapsed duration so an instant fetch does not
//!   look jarring;
//! - the scripted steps run at a jittered pace; the final step peeks at the
//!   computation with a short grace window, after which the computation is
//!   awaited unconditionally.
//!
//! Nothing is ever cancelled: a background call that loses a race keeps
//! running and its result goes unread. Timeouts here pace the presentation;
//! they do not reclaim resources.

use caseline_client::{BackendError, GraphReply};
use caseline_core::investigation::{
    CaseProfile, GraphSnapshot, InvestigationResult, StrategyOption, build_strategy_options,
};
use caseline_core::session::{ChatMessage, INVESTIGATION_SESSION_TITLE, ViewState};
use crate::app::ChatApp;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep, timeout};

/// The scripted narrative steps, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationStep {
    /// Parsing the uploaded documents.
    Parsing,
    /// Flagging the contested issues.
    Issues,
    /// Mapping the similarity graph.
    Graph,
    /// Analyzing argument patterns (the step that may show live figures).
    Patterns,
}

impl InvestigationStep {
    pub const ALL: [Self; 4] = [Self::Parsing, Self::Issues, Self::Graph, Self::Patterns];
}

/// Orchestrator lifecycle, observable through [`ChatApp::investigation_phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationPhase {
    Idle,
    Initializing,
    Step(InvestigationStep),
    Rendered,
    Failed,
}

impl ChatApp {
    /// Returns the orchestrator's last observed phase.
    pub async fn investigation_phase(&self) -> InvestigationPhase {
        self.state.lock().await.investigation_phase
    }

    /// Runs one investigation to completion.
    ///
    /// A call while another investigation is in flight is ignored; there is
    /// no queueing of a second request. Regardless of outcome, chat input
    /// and the investigation trigger are re-enabled when the run ends.
    pub async fn start_investigation(&self) {
        let origin = {
            let mut state = self.state.lock().await;
            if state.investigation_running {
                tracing::warn!("investigation already in flight; ignoring start");
                return;
            }
            state.investigation_running = true;
            // The capability flag is consumed by launching.
            state.ready_to_investigate = false;
            state.investigation_phase = InvestigationPhase::Initializing;
            if let Some(session) = state.store.active_session_mut() {
                session.set_title_once(INVESTIGATION_SESSION_TITLE);
            }
            state.store.live_view_mut().clear();
            state.store.origin_token()
        };
        self.presenter.set_input_enabled(false);
        self.presenter.set_investigate_enabled(false);
        self.presenter.replace_view(&ViewState::default());
        tracing::info!(session_id = origin.session_id(), "investigation started");

        let started = Instant::now();

        // Both background operations are dispatched up front and never
        // aborted; the orchestrator reads their results when it is ready.
        let (result_tx, mut result_rx) = oneshot::channel();
        {
            let client = Arc::clone(&self.client);
            let session_id = origin.session_id().to_string();
            tokio::spawn(async move {
                let _ = result_tx.send(client.start_investigation(&session_id).await);
            });
        }
        let (graph_tx, graph_rx) = oneshot::channel();
        {
            let client = Arc::clone(&self.client);
            let session_id = origin.session_id().to_string();
            tokio::spawn(async move {
                let _ = graph_tx.send(client.fetch_graph(&session_id).await);
            });
        }

        // Initializing: whichever of fetch and timeout resolves first wins;
        // a failed or slow fetch degrades to placeholder data, silently.
        let (snapshot, profile) = match timeout(self.timing.graph_timeout, graph_rx).await {
            Ok(Ok(Ok(GraphReply { snapshot, profile }))) => (snapshot, profile),
            Ok(Ok(Err(err))) => {
                tracing::debug!(%err, "graph fetch failed; using placeholder data");
                (GraphSnapshot::placeholder(), None)
            }
            Ok(Err(_)) | Err(_) => {
                tracing::debug!("graph fetch unavailable in time; using placeholder data");
                (GraphSnapshot::placeholder(), None)
            }
        };
        let elapsed = started.elapsed();
        if elapsed < self.timing.min_init {
            sleep(self.timing.min_init - elapsed).await;
        }

        // The scripted steps. Steps 1-3 are graph/profile driven; step 4
        // gets one short chance to show live figures.
        let mut early: Option<Result<InvestigationResult, BackendError>> = None;
        for (index, step) in InvestigationStep::ALL.into_iter().enumerate() {
            self.state.lock().await.investigation_phase = InvestigationPhase::Step(step);

            let lines = if step == InvestigationStep::Patterns {
                match timeout(self.timing.result_grace, &mut result_rx).await {
                    Ok(received) => {
                        let result = received.unwrap_or_else(|_| {
                            Err(BackendError::Transport("investigation task failed".into()))
                        });
                        let lines = match &result {
                            Ok(r) => patterns_lines_live(r),
                            Err(_) => patterns_lines_fallback(&snapshot),
                        };
                        early = Some(result);
                        lines
                    }
                    Err(_) => patterns_lines_fallback(&snapshot),
                }
            } else {
                scripted_lines(step, &snapshot, profile.as_ref())
            };

            // Steps paint only while the origin session is on screen; a
            // switched-away run keeps pacing but stays invisible.
            if self.origin_is_active(&origin).await {
                self.presenter.show_investigation_step(step, &lines);
            }
            sleep(self.timing.step_delay(index)).await;
        }

        // No more racing: the computation is awaited to completion.
        let outcome = match early {
            Some(result) => result,
            None => result_rx.await.unwrap_or_else(|_| {
                Err(BackendError::Transport("investigation task failed".into()))
            }),
        };

        match outcome {
            Ok(result) => {
                let options = build_strategy_options(&result);
                let summary = if result.explanation.is_empty() {
                    format!("Analysis complete: {} strategy options prepared.", options.len())
                } else {
                    result.explanation.clone()
                };
                self.state.lock().await.investigation_phase = InvestigationPhase::Rendered;
                self.deliver(&origin, ChatMessage::assistant(summary)).await;
                if self.origin_is_active(&origin).await {
                    self.presenter.render_strategy_options(&options);
                } else {
                    // The options are the deliverable; merge a transcript
                    // rendition so switching back still shows them.
                    let text = options_text(&options);
                    self.deliver(&origin, ChatMessage::assistant(text)).await;
                }
                tracing::info!(options = options.len(), "investigation rendered");
            }
            Err(err) => {
                self.state.lock().await.investigation_phase = InvestigationPhase::Failed;
                tracing::warn!(%err, "investigation failed");
                if self.origin_is_active(&origin).await {
                    self.presenter.show_investigation_failure(err.detail());
                } else {
                    let line = format!("Investigation failed: {}", err.detail());
                    self.deliver(&origin, ChatMessage::assistant(line)).await;
                }
            }
        }

        // Terminal: controls come back regardless of outcome.
        self.state.lock().await.investigation_running = false;
        self.presenter.set_input_enabled(true);
        self.presenter.set_investigate_enabled(true);
    }

    async fn origin_is_active(&self, origin: &caseline_core::session::OriginToken) -> bool {
        self.state.lock().await.store.active_id() == origin.session_id()
    }
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Transcript rendition of the options, for an origin session that is no
/// longer on screen.
fn options_text(options: &[StrategyOption]) -> String {
    let mut text = String::from("Strategy options:");
    for (index, option) in options.iter().enumerate() {
        text.push_str(&format!("\n{}. {}: {}", index + 1, option.title, option.summary));
    }
    text
}

/// Narrative for the graph/profile driven steps (1-3).
fn scripted_lines(
    step: InvestigationStep,
    snapshot: &GraphSnapshot,
    profile: Option<&CaseProfile>,
) -> Vec<String> {
    match step {
        InvestigationStep::Parsing => {
            let mut lines = vec![
                "Parsing uploaded documents...".to_string(),
                "Extracting filing details and stated arguments...".to_string(),
            ];
            if let Some(p) = profile {
                if !p.job_title.is_empty() {
                    lines.push(format!("Profile detected: {} ({})", p.job_title, p.company_type));
                }
            }
            lines
        }
        InvestigationStep::Issues => {
            let issues = profile.map(|p| p.rfe_issues.as_slice()).unwrap_or(&[]);
            if issues.is_empty() {
                vec![
                    "Flagging contested issues...".to_string(),
                    "Reviewing the grounds raised in the record...".to_string(),
                ]
            } else {
                vec![
                    "Flagging contested issues...".to_string(),
                    format!("Issues raised: {}", issues.join(", ")),
                ]
            }
        }
        InvestigationStep::Graph => vec![
            format!(
                "Mapped {} comparable cases across {} similarity links.",
                snapshot.nodes.len(),
                snapshot.edges.len()
            ),
            format!("{} close matches to your fact pattern.", snapshot.similar_ids.len()),
        ],
        // The final step has its own live/fallback paths.
        InvestigationStep::Patterns => patterns_lines_fallback(snapshot),
    }
}

/// Final-step narrative when the computation finished inside the grace
/// window: real figures.
fn patterns_lines_live(result: &InvestigationResult) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(rec) = result.recommendations.first() {
        lines.push(format!("Strongest addition: '{}' ({})", rec.argument, rec.impact));
    }
    if let Some(pattern) = result.winning_patterns.first() {
        lines.push(format!(
            "Winning combination: {} ({} success rate)",
            pattern.arguments.join(" + "),
            percent(pattern.success_rate)
        ));
    }
    let prob = &result.success_probability;
    lines.push(format!(
        "Estimated success: {} (base {}, argument boost +{})",
        percent(prob.combined),
        percent(prob.base),
        percent(prob.argument_boost)
    ));
    lines
}

/// Final-step narrative when the computation is not ready yet: equivalent
/// copy derived from the snapshot's outcome counts.
fn patterns_lines_fallback(snapshot: &GraphSnapshot) -> Vec<String> {
    let (sustained, total) = snapshot.similar_outcome_counts();
    vec![
        "Analyzing argument patterns in comparable cases...".to_string(),
        format!("{sustained} of {total} similar cases ended in a sustained appeal."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Timing;
    use crate::test_support::{MockBackend, MockPresenter, PresenterEvent, fast_timing};
    use caseline_core::session::DEFAULT_SESSION_TITLE;
    use std::time::Duration;

    fn app(backend: Arc<MockBackend>, presenter: Arc<MockPresenter>) -> ChatApp {
        ChatApp::new(backend, presenter).with_timing(fast_timing())
    }

    fn step_events(presenter: &MockPresenter) -> Vec<InvestigationStep> {
        presenter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Step(step, _) => Some(step),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn plays_all_steps_then_renders_options() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        app.start_investigation().await;

        assert_eq!(step_events(&presenter), InvestigationStep::ALL.to_vec());
        assert!(presenter.contains(|e| matches!(e, PresenterEvent::Options(n) if *n >= 1)));
        // Controls restored at the terminal state.
        let events = presenter.events();
        assert!(matches!(events.last(), Some(PresenterEvent::Investigate(true))));
        assert!(presenter.contains(|e| matches!(e, PresenterEvent::Input(true))));
        assert_eq!(app.investigation_phase().await, InvestigationPhase::Rendered);
    }

    #[tokio::test]
    async fn renames_session_once_and_clears_view() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter);

        app.start_investigation().await;

        let store = app.store_snapshot().await;
        assert_eq!(store.active_session().unwrap().title, INVESTIGATION_SESSION_TITLE);
        // The rendered summary is the only transcript content left.
        assert_eq!(store.live_view().messages.len(), 1);
        // Launching consumed the capability flag.
        assert!(!app.ready_to_investigate().await);
    }

    #[tokio::test]
    async fn investigation_does_not_rename_an_already_named_session() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter);

        app.send_message("name this thread").await;
        assert_ne!(app.store_snapshot().await.active_session().unwrap().title, DEFAULT_SESSION_TITLE);

        app.start_investigation().await;

        let store = app.store_snapshot().await;
        assert_eq!(store.active_session().unwrap().title, "name this thread");
    }

    #[tokio::test]
    async fn unresolved_graph_fetch_degrades_to_placeholder_within_bound() {
        let backend =
            Arc::new(MockBackend::new().with_graph_delay(Duration::from_secs(600)));
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        let started = std::time::Instant::now();
        app.start_investigation().await;

        // Completed despite the hung fetch, and well inside the hung
        // fetch's latency.
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(presenter.contains(|e| matches!(e, PresenterEvent::Options(_))));
        // Placeholder data drove the graph step (six synthetic cases).
        assert!(presenter.contains(|e| matches!(
            e,
            PresenterEvent::Step(InvestigationStep::Graph, lines)
                if lines[1].starts_with("6 close matches")
        )));
    }

    #[tokio::test]
    async fn second_start_while_running_is_ignored() {
        let backend = Arc::new(
            MockBackend::new().with_investigation_delay(Duration::from_millis(50)),
        );
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend.clone(), presenter.clone());

        let first = app.clone();
        let second = app.clone();
        let h1 = tokio::spawn(async move { first.start_investigation().await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let h2 = tokio::spawn(async move { second.start_investigation().await });
        h1.await.unwrap();
        h2.await.unwrap();

        // One dispatch, one pass over the steps.
        assert_eq!(backend.investigation_calls(), 1);
        assert_eq!(step_events(&presenter).len(), 4);
    }

    #[tokio::test]
    async fn fast_computation_feeds_live_figures_into_final_step() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        app.start_investigation().await;

        assert!(presenter.contains(|e| matches!(
            e,
            PresenterEvent::Step(InvestigationStep::Patterns, lines)
                if lines.iter().any(|l| l.starts_with("Estimated success:"))
        )));
    }

    #[tokio::test]
    async fn slow_computation_falls_back_then_still_renders() {
        let backend = Arc::new(
            MockBackend::new().with_investigation_delay(Duration::from_millis(150)),
        );
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        app.start_investigation().await;

        // Grace window misses: the step derives from outcome counts.
        assert!(presenter.contains(|e| matches!(
            e,
            PresenterEvent::Step(InvestigationStep::Patterns, lines)
                if lines.iter().any(|l| l.contains("similar cases ended in a sustained appeal"))
        )));
        // The final await still delivers the real result.
        assert!(presenter.contains(|e| matches!(e, PresenterEvent::Options(_))));
        assert_eq!(app.investigation_phase().await, InvestigationPhase::Rendered);
    }

    #[tokio::test]
    async fn failed_computation_shows_inline_failure_and_restores_controls() {
        let backend = Arc::new(MockBackend::new());
        backend.set_investigation_result(Err(BackendError::Api("no documents on file".into())));
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        app.start_investigation().await;

        assert!(presenter.contains(
            |e| matches!(e, PresenterEvent::Failure(d) if d == "no documents on file")
        ));
        assert!(presenter.contains(|e| matches!(e, PresenterEvent::Input(true))));
        assert_eq!(app.investigation_phase().await, InvestigationPhase::Failed);

        // The guard released: a new run is accepted.
        app.start_investigation().await;
        assert_eq!(step_events(&presenter).len(), 8);
    }

    #[tokio::test]
    async fn switching_away_stops_step_painting() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let timing = Timing {
            step_base: [Duration::from_millis(30); 4],
            ..fast_timing()
        };
        let app = ChatApp::new(backend, presenter.clone()).with_timing(timing);

        let runner = app.clone();
        let handle = tokio::spawn(async move { runner.start_investigation().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        app.create_session().await;
        handle.await.unwrap();

        // Only the step shown before the switch was painted; the new
        // session's live view stays untouched.
        assert_eq!(step_events(&presenter), vec![InvestigationStep::Parsing]);
        assert!(!presenter.contains(|e| matches!(e, PresenterEvent::Options(_))));
        assert!(app.store_snapshot().await.live_view().messages.is_empty());
    }

    #[tokio::test]
    async fn options_survive_in_origin_snapshot_after_switching_away() {
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = app(backend, presenter.clone());

        let origin_id = app.active_session_id().await;
        let runner = app.clone();
        let handle = tokio::spawn(async move { runner.start_investigation().await });
        tokio::time::sleep(Duration::from_millis(3)).await;
        app.create_session().await;
        handle.await.unwrap();

        // Switching back reveals the summary and a transcript rendition of
        // the options.
        app.switch_session(&origin_id).await.unwrap();
        let store = app.store_snapshot().await;
        let texts: Vec<_> = store
            .live_view()
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(texts[0], "Based on 18 similar cases.");
        assert!(texts[1].starts_with("Strategy options:"));
        assert!(texts[1].contains("expert_opinion"));
        // Nothing was painted over the session that was active meanwhile.
        assert!(!presenter.contains(|e| matches!(e, PresenterEvent::Options(_))));
    }

    #[tokio::test]
    async fn initializing_enforces_minimum_duration() {
        let timing = Timing {
            min_init: Duration::from_millis(80),
            ..fast_timing()
        };
        let backend = Arc::new(MockBackend::new());
        let presenter = Arc::new(MockPresenter::new());
        let app = ChatApp::new(backend, presenter).with_timing(timing);

        let started = std::time::Instant::now();
        app.start_investigation().await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }
}
