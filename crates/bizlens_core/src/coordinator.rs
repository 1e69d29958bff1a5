//! Streaming response coordinator
//!
//! Owns the single live [`ChatSession`] and turns each user message into a
//! [`TurnStream`]: cumulative text increments followed by exactly one
//! [`TurnEvent::Completed`].
//!
//! ```text
//!  Idle ──send──▶ Sending ──first event──▶ Streaming ──end──▶ Completed
//!                    │                         │
//!                    └─────── error ───────────┴──▶ Failed (partial + notice)
//!
//!  reset() at any point: Abandoned, no further increments
//! ```

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use bizlens_constant::prompt::FALLBACK_NOTICE;
use bizlens_llms::{GenerateRequest, Message, Provider, StreamEvent, Usage};
use bizlens_observability::{record_duration, record_error, turn_span};

use crate::context::BusinessContext;
use crate::error::{ChatError, Result};
use crate::session::{ChatSession, SessionConfig, SessionId};

/// Builds the backend for a new session.
pub type ProviderFactory =
    Arc<dyn Fn(&SessionConfig) -> bizlens_llms::Result<Arc<dyn Provider>> + Send + Sync>;

/// Terminal state of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    /// Transmission failed; the outcome text carries the partial reply and
    /// the fallback notice.
    Failed { error: String },
    /// Superseded by `reset()` before it finished.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub text: String,
    pub status: TurnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl TurnOutcome {
    fn abandoned(text: String) -> Self {
        Self {
            text,
            status: TurnStatus::Abandoned,
            usage: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TurnStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TurnStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// Everything received so far, not just the newest fragment.
    Increment(String),
    Completed(TurnOutcome),
}

/// Lazy, finite stream of one turn's events. Dropping it before completion
/// abandons the turn without committing it.
pub struct TurnStream {
    session_id: SessionId,
    inner: BoxStream<'static, TurnEvent>,
}

impl TurnStream {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Stream for TurnStream {
    type Item = TurnEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for TurnStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStream")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

struct State {
    session: Option<ChatSession>,
    /// Bumped on every reset; turns from an older epoch are stale.
    epoch: u64,
    in_flight: bool,
    cancel: CancellationToken,
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates turns over one session at a time.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct ChatCoordinator {
    config: SessionConfig,
    factory: ProviderFactory,
    state: Arc<Mutex<State>>,
}

impl ChatCoordinator {
    /// The session itself is created lazily on the first `send`.
    pub fn new(config: SessionConfig, factory: ProviderFactory) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            factory,
            state: Arc::new(Mutex::new(State {
                session: None,
                epoch: 0,
                in_flight: false,
                cancel: CancellationToken::new(),
            })),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn create_session(&self) -> Result<ChatSession> {
        let provider = (self.factory)(&self.config).map_err(|e| {
            tracing::warn!(error = %e, "chat session creation failed");
            ChatError::SessionInit(e)
        })?;
        let session = ChatSession::new(self.config.clone(), provider);
        tracing::debug!(
            session.id = %session.id,
            model = %session.config.model,
            "chat session created"
        );
        Ok(session)
    }

    /// Replace the session with a fresh one built from the same config.
    ///
    /// Any turn in flight is abandoned and will not be committed. If the new
    /// session cannot be built, none is kept and the next `send` retries.
    pub fn reset(&self) -> Result<()> {
        let fresh = self.create_session();

        let mut state = lock_state(&self.state);
        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        state.epoch += 1;
        state.in_flight = false;

        match fresh {
            Ok(session) => {
                tracing::info!(session.id = %session.id, "chat session reset");
                state.session = Some(session);
                Ok(())
            }
            Err(e) => {
                state.session = None;
                Err(e)
            }
        }
    }

    /// Start a turn.
    ///
    /// Fails fast on an empty message, a turn already in flight, or a session
    /// that cannot be created. Transmission problems never surface here; they
    /// end the returned stream with a failed outcome.
    pub fn send(&self, user_message: &str, context: &BusinessContext) -> Result<TurnStream> {
        if user_message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let needs_session = {
            let state = lock_state(&self.state);
            if state.in_flight {
                return Err(ChatError::TurnInFlight);
            }
            state.session.is_none()
        };
        let fresh = if needs_session {
            Some(self.create_session()?)
        } else {
            None
        };

        let prompt = context.compose_prompt(user_message);

        let mut state = lock_state(&self.state);
        if state.in_flight {
            return Err(ChatError::TurnInFlight);
        }
        if state.session.is_none() {
            state.session = fresh;
        }
        let Some(session) = state.session.as_ref() else {
            return Err(ChatError::SessionInit(bizlens_llms::Error::Other(
                "no session available".to_string(),
            )));
        };

        let request = session.build_request(&prompt);
        let provider = session.provider();
        let session_id = session.id.clone();
        let turn_index = session.turn_count() + 1;

        state.in_flight = true;
        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            epoch: state.epoch,
            released: false,
        };
        let cancel = state.cancel.clone();
        drop(state);

        let span = turn_span!(session_id, turn_index as u64);
        let inner = run_turn(provider, request, prompt, cancel, guard, span);

        Ok(TurnStream {
            session_id,
            inner: Box::pin(inner),
        })
    }

    /// Drive a turn to the end, reporting cumulative text along the way.
    ///
    /// Returns the final text, including the fallback notice on failure.
    pub async fn send_with<F>(
        &self,
        user_message: &str,
        context: &BusinessContext,
        mut on_increment: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut stream = self.send(user_message, context)?;
        let mut final_text = String::new();

        while let Some(event) = stream.next().await {
            match event {
                TurnEvent::Increment(text) => {
                    on_increment(&text);
                    final_text = text;
                }
                TurnEvent::Completed(outcome) => final_text = outcome.text,
            }
        }

        Ok(final_text)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        lock_state(&self.state).session.as_ref().map(|s| s.id.clone())
    }

    /// Committed turns in the current session.
    pub fn turn_count(&self) -> usize {
        lock_state(&self.state)
            .session
            .as_ref()
            .map_or(0, ChatSession::turn_count)
    }

    /// Snapshot of the committed history.
    pub fn history(&self) -> Vec<Message> {
        lock_state(&self.state)
            .session
            .as_ref()
            .map(|s| s.history().to_vec())
            .unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        lock_state(&self.state).in_flight
    }
}

impl std::fmt::Debug for ChatCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("ChatCoordinator")
            .field("config", &self.config)
            .field("session", &state.session)
            .field("epoch", &state.epoch)
            .field("in_flight", &state.in_flight)
            .finish()
    }
}

/// Clears the in-flight flag exactly once, unless a reset already did.
struct InFlightGuard {
    state: Arc<Mutex<State>>,
    epoch: u64,
    released: bool,
}

impl InFlightGuard {
    /// Release the turn, committing `commit` to the session history.
    /// Returns false if a reset superseded the turn.
    fn finish(&mut self, commit: Option<(String, String)>) -> bool {
        self.released = true;
        let mut state = lock_state(&self.state);
        if state.epoch != self.epoch {
            return false;
        }
        state.in_flight = false;
        if let (Some((prompt, reply)), Some(session)) = (commit, state.session.as_mut()) {
            session.commit_turn(prompt, reply);
        }
        true
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut state = lock_state(&self.state);
        if state.epoch == self.epoch {
            state.in_flight = false;
            tracing::debug!("turn dropped before completion");
        }
    }
}

fn run_turn(
    provider: Arc<dyn Provider>,
    request: GenerateRequest,
    prompt: String,
    cancel: CancellationToken,
    mut guard: InFlightGuard,
    span: tracing::Span,
) -> impl Stream<Item = TurnEvent> + Send + 'static {
    async_stream::stream! {
        let started = Instant::now();
        let mut text = String::new();
        let mut usage: Option<Usage> = None;
        let mut failure: Option<String> = None;
        let mut abandoned = false;

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = provider.stream(request).instrument(span.clone()) => Some(result),
        };

        match opened {
            None => abandoned = true,
            Some(Err(e)) => failure = Some(e.to_string()),
            Some(Ok(mut events)) => loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        abandoned = true;
                        break;
                    }
                    ev = events.next().instrument(span.clone()) => ev,
                };

                match next {
                    Some(Ok(StreamEvent::TextDelta { delta, .. })) => {
                        if delta.is_empty() {
                            continue;
                        }
                        text.push_str(&delta);
                        yield TurnEvent::Increment(text.clone());
                    }
                    Some(Ok(StreamEvent::Start { id })) => {
                        tracing::debug!(parent: &span, generation.id = %id, "stream started");
                    }
                    Some(Ok(StreamEvent::Finish { usage: u, reason })) => {
                        tracing::debug!(parent: &span, reason = ?reason.unified, tokens = u.total_tokens, "stream finished");
                        usage = Some(u);
                    }
                    Some(Ok(StreamEvent::Error { message })) => {
                        failure = Some(message);
                        break;
                    }
                    Some(Err(e)) => {
                        failure = Some(e.to_string());
                        break;
                    }
                    None => break,
                }
            },
        }

        span.in_scope(|| record_duration("llm.stream_duration_ms", started.elapsed()));
        span.record("turn.chars", text.len() as u64);

        if abandoned {
            guard.finish(None);
            span.record("turn.status", "abandoned");
            yield TurnEvent::Completed(TurnOutcome::abandoned(text));
            return;
        }

        if let Some(error) = failure {
            span.in_scope(|| record_error(&ChatError::StreamTransmission(error.clone())));
            if !guard.finish(None) {
                span.record("turn.status", "abandoned");
                yield TurnEvent::Completed(TurnOutcome::abandoned(text));
                return;
            }
            span.record("turn.status", "failed");
            let final_text = format!("{}{}", text, FALLBACK_NOTICE);
            yield TurnEvent::Increment(final_text.clone());
            yield TurnEvent::Completed(TurnOutcome {
                text: final_text,
                status: TurnStatus::Failed { error },
                usage,
            });
            return;
        }

        // An empty model turn is not a valid history entry.
        let commit = (!text.is_empty()).then(|| (prompt, text.clone()));
        if guard.finish(commit) {
            span.record("turn.status", "completed");
            tracing::info!(parent: &span, chars = text.len(), "turn completed");
            yield TurnEvent::Completed(TurnOutcome {
                text,
                status: TurnStatus::Completed,
                usage,
            });
        } else {
            span.record("turn.status", "abandoned");
            yield TurnEvent::Completed(TurnOutcome::abandoned(text));
        }
    }
}
