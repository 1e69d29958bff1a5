//! Scripted provider and helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;

use bizlens_core::{ChatCoordinator, ProviderFactory, SessionConfig, TurnEvent, TurnStream};
use bizlens_llms::{
    Error, FinishReason, FinishReasonKind, GenerateRequest, GenerateStream,
    Headers, Provider, Role, StreamEvent, Usage,
};

pub type EventSender = mpsc::UnboundedSender<bizlens_llms::Result<StreamEvent>>;

/// What the provider does for one `stream` call.
pub enum Script {
    /// Deliver every fragment, then finish normally.
    Fragments(Vec<&'static str>),
    /// Deliver the fragments, then fail with a transport error.
    FailAfter(Vec<&'static str>, &'static str),
    /// Deliver the fragments, then a backend-reported error event.
    ErrorEventAfter(Vec<&'static str>, &'static str),
    /// Refuse to open the stream at all.
    OpenError(&'static str),
    /// Events are pushed by the test through the paired sender.
    Channel(mpsc::UnboundedReceiver<bizlens_llms::Result<StreamEvent>>),
}

impl Script {
    pub fn channel() -> (Script, EventSender) {
        let (tx, rx) = mpsc::unbounded();
        (Script::Channel(rx), tx)
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Content of the final user message of the n-th request.
    pub fn prompt(&self, n: usize) -> String {
        let requests = self.requests();
        let request = &requests[n];
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        last.content.clone()
    }
}

fn deltas(fragments: &[&'static str]) -> Vec<bizlens_llms::Result<StreamEvent>> {
    fragments
        .iter()
        .map(|f| Ok(StreamEvent::text_delta("scripted", *f)))
        .collect()
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn build_headers(&self, _custom_headers: Option<&Headers>) -> Headers {
        Headers::new()
    }

    async fn stream(&self, request: GenerateRequest) -> bizlens_llms::Result<GenerateStream> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Fragments(vec!["ok"]));

        match script {
            Script::Fragments(fragments) => {
                let mut events = vec![Ok(StreamEvent::start("scripted"))];
                events.extend(deltas(&fragments));
                events.push(Ok(StreamEvent::finish(
                    Usage::new(10, fragments.len() as u32),
                    FinishReason::with_raw(FinishReasonKind::Stop, "STOP"),
                )));
                Ok(GenerateStream::from_events(events))
            }
            Script::FailAfter(fragments, message) => {
                let mut events = deltas(&fragments);
                events.push(Err(Error::stream_error(message)));
                Ok(GenerateStream::from_events(events))
            }
            Script::ErrorEventAfter(fragments, message) => {
                let mut events = deltas(&fragments);
                events.push(Ok(StreamEvent::error(message)));
                Ok(GenerateStream::from_events(events))
            }
            Script::OpenError(message) => Err(Error::provider_error(message)),
            Script::Channel(rx) => Ok(GenerateStream::new(Box::pin(rx))),
        }
    }
}

/// Factory handing out the same scripted provider, counting sessions built.
pub fn factory(provider: &Arc<ScriptedProvider>) -> (ProviderFactory, Arc<AtomicUsize>) {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let provider: Arc<dyn Provider> = provider.clone();
    let factory: ProviderFactory = Arc::new(move |_config: &SessionConfig| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&provider))
    });
    (factory, created)
}

pub fn failing_factory() -> ProviderFactory {
    Arc::new(|_config: &SessionConfig| Err(Error::MissingApiKey("gemini".to_string())))
}

pub fn coordinator(provider: &Arc<ScriptedProvider>) -> ChatCoordinator {
    let (factory, _) = factory(provider);
    ChatCoordinator::new(SessionConfig::default(), factory).unwrap()
}

pub async fn collect(stream: TurnStream) -> Vec<TurnEvent> {
    stream.collect().await
}

/// Cumulative texts of every increment, in order.
pub fn increments(events: &[TurnEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            TurnEvent::Increment(text) => Some(text.clone()),
            TurnEvent::Completed(_) => None,
        })
        .collect()
}

pub fn outcome(events: &[TurnEvent]) -> bizlens_core::TurnOutcome {
    match events.last() {
        Some(TurnEvent::Completed(outcome)) => outcome.clone(),
        other => panic!("turn did not complete: {:?}", other),
    }
}
