//! Shared mocks for the orchestration tests.
//!
//! `MockBackend` scripts per-call results and latencies; `MockPresenter`
//! records every rendering call as an event so tests can assert on ordering.

use async_trait::async_trait;
use caseline_client::{
    BackendClient, BackendError, ChatReply, GraphReply, ReportReply, ReportRequest, UploadReply,
};
use caseline_core::investigation::{
    CaseNode, CaseProfile, GraphSnapshot, InvestigationResult, Recommendation, StrategyOption,
    SuccessProbability, WinningPattern,
};
use caseline_core::session::{ChatMessage, FileRef, MessageRole, ViewState};
use crate::app::Timing;
use crate::investigation::InvestigationStep;
use crate::presenter::Presenter;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Millisecond-scale pacing so the choreography tests finish quickly.
pub fn fast_timing() -> Timing {
    Timing {
        graph_timeout: Duration::from_millis(30),
        min_init: Duration::from_millis(1),
        step_base: [Duration::from_millis(5); 4],
        pace: 1.0,
        jitter: 0.0,
        step_floor: Duration::from_millis(1),
        result_grace: Duration::from_millis(20),
        inter_file_pause: Duration::from_millis(1),
    }
}

fn sample_result() -> InvestigationResult {
    InvestigationResult {
        success_probability: SuccessProbability {
            base: 0.3,
            argument_boost: 0.12,
            combined: 0.42,
            confidence: "medium".to_string(),
            sample_size: 18,
            sustained_count: 5,
        },
        recommendations: vec![Recommendation {
            argument: "expert_opinion".to_string(),
            impact: "+21% success in similar cases".to_string(),
            confidence: "medium".to_string(),
            sample_size: 12,
        }],
        winning_patterns: vec![WinningPattern {
            arguments: vec!["expert_opinion".to_string(), "prevailing_wage".to_string()],
            success_rate: 0.7,
            sample_size: 10,
        }],
        association_rules: vec![],
        current_strategy_risk: "high".to_string(),
        explanation: "Based on 18 similar cases.".to_string(),
    }
}

fn sample_graph() -> GraphReply {
    let nodes = vec![
        CaseNode {
            id: "c1".to_string(),
            label: "Software Engineer RFE".to_string(),
            outcome: Some("SUSTAINED".to_string()),
        },
        CaseNode {
            id: "c2".to_string(),
            label: "Data Analyst RFE".to_string(),
            outcome: Some("DISMISSED".to_string()),
        },
        CaseNode {
            id: "c3".to_string(),
            label: "Consultant RFE".to_string(),
            outcome: Some("SUSTAINED".to_string()),
        },
    ];
    GraphReply {
        snapshot: GraphSnapshot {
            edges: nodes
                .iter()
                .map(|n| ("user".to_string(), n.id.clone()))
                .collect(),
            similar_ids: nodes.iter().map(|n| n.id.clone()).collect(),
            nodes,
            user_node: CaseNode {
                id: "user".to_string(),
                label: "Your case".to_string(),
                outcome: None,
            },
        },
        profile: Some(CaseProfile {
            job_title: "Data Engineer".to_string(),
            company_type: "consulting".to_string(),
            rfe_issues: vec!["wage_level".to_string()],
        }),
    }
}

/// Scriptable [`BackendClient`] double.
///
/// Queued results are consumed in order; an empty queue falls back to a
/// benign default, so tests only script what they assert on.
pub struct MockBackend {
    chat_delay: Duration,
    graph_delay: Duration,
    investigation_delay: Duration,
    chat_queue: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    upload_queue: Mutex<VecDeque<(Duration, Result<UploadReply, BackendError>)>>,
    investigation_result: Mutex<Result<InvestigationResult, BackendError>>,
    graph_result: Mutex<Result<GraphReply, BackendError>>,
    chat_count: AtomicUsize,
    reset_count: AtomicUsize,
    investigation_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            chat_delay: Duration::ZERO,
            graph_delay: Duration::ZERO,
            investigation_delay: Duration::ZERO,
            chat_queue: Mutex::new(VecDeque::new()),
            upload_queue: Mutex::new(VecDeque::new()),
            investigation_result: Mutex::new(Ok(sample_result())),
            graph_result: Mutex::new(Ok(sample_graph())),
            chat_count: AtomicUsize::new(0),
            reset_count: AtomicUsize::new(0),
            investigation_count: AtomicUsize::new(0),
        }
    }

    pub fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = delay;
        self
    }

    pub fn with_graph_delay(mut self, delay: Duration) -> Self {
        self.graph_delay = delay;
        self
    }

    pub fn with_investigation_delay(mut self, delay: Duration) -> Self {
        self.investigation_delay = delay;
        self
    }

    pub fn push_chat_result(&self, result: Result<ChatReply, BackendError>) {
        self.chat_queue.lock().unwrap().push_back(result);
    }

    pub fn push_upload_result(&self, delay: Duration, result: Result<UploadReply, BackendError>) {
        self.upload_queue.lock().unwrap().push_back((delay, result));
    }

    pub fn set_investigation_result(&self, result: Result<InvestigationResult, BackendError>) {
        *self.investigation_result.lock().unwrap() = result;
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_count.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_count.load(Ordering::SeqCst)
    }

    pub fn investigation_calls(&self) -> usize {
        self.investigation_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn chat(&self, message: &str, _session_id: &str) -> Result<ChatReply, BackendError> {
        self.chat_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.chat_queue.lock().unwrap().pop_front();
        tokio::time::sleep(self.chat_delay).await;
        scripted.unwrap_or_else(|| {
            Ok(ChatReply {
                text: format!("You said: {message}"),
            })
        })
    }

    async fn upload(&self, file: &FileRef, _session_id: &str) -> Result<UploadReply, BackendError> {
        let scripted = self.upload_queue.lock().unwrap().pop_front();
        let (delay, result) = scripted.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Ok(UploadReply {
                    text: format!("Received {}", file.name),
                    file_url: None,
                    ready_to_investigate: false,
                }),
            )
        });
        tokio::time::sleep(delay).await;
        result
    }

    async fn reset_session(&self, _session_id: &str) -> Result<(), BackendError> {
        self.reset_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_investigation(
        &self,
        _session_id: &str,
    ) -> Result<InvestigationResult, BackendError> {
        self.investigation_count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.investigation_delay).await;
        self.investigation_result.lock().unwrap().clone()
    }

    async fn fetch_graph(&self, _session_id: &str) -> Result<GraphReply, BackendError> {
        tokio::time::sleep(self.graph_delay).await;
        self.graph_result.lock().unwrap().clone()
    }

    async fn send_report(&self, request: &ReportRequest) -> Result<ReportReply, BackendError> {
        Ok(ReportReply {
            mailto_url: Some(format!("mailto:{}?subject=Strategy%20Report", request.email)),
        })
    }
}

/// One recorded rendering call.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Message(MessageRole, String),
    ViewReplaced(usize),
    Awaiting(bool),
    Input(bool),
    Investigate(bool),
    Step(InvestigationStep, Vec<String>),
    Options(usize),
    Failure(String),
    ReportLink(String),
}

/// Recording [`Presenter`] double.
pub struct MockPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl MockPresenter {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, pred: impl Fn(&PresenterEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(pred)
    }

    fn record(&self, event: PresenterEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for MockPresenter {
    fn append_message(&self, message: &ChatMessage) {
        self.record(PresenterEvent::Message(message.role, message.content.clone()));
    }

    fn replace_view(&self, view: &ViewState) {
        self.record(PresenterEvent::ViewReplaced(view.messages.len()));
    }

    fn set_awaiting_reply(&self, awaiting: bool) {
        self.record(PresenterEvent::Awaiting(awaiting));
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.record(PresenterEvent::Input(enabled));
    }

    fn set_investigate_enabled(&self, enabled: bool) {
        self.record(PresenterEvent::Investigate(enabled));
    }

    fn show_investigation_step(&self, step: InvestigationStep, lines: &[String]) {
        self.record(PresenterEvent::Step(step, lines.to_vec()));
    }

    fn render_strategy_options(&self, options: &[StrategyOption]) {
        self.record(PresenterEvent::Options(options.len()));
    }

    fn show_investigation_failure(&self, detail: &str) {
        self.record(PresenterEvent::Failure(detail.to_string()));
    }

    fn show_report_link(&self, mailto_url: &str) {
        self.record(PresenterEvent::ReportLink(mailto_url.to_string()));
    }
}
