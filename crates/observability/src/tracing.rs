//! Span helpers

/// Span covering one chat turn, from send to completion.
///
/// Fields left empty are filled in as the turn progresses.
///
/// ```rust
/// let span = bizlens_observability::turn_span!("session-1", 3_usize);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! turn_span {
    ($session_id:expr, $turn:expr) => {
        $crate::__tracing::info_span!(
            "chat.turn",
            session.id = %$session_id,
            turn.index = $turn,
            turn.status = $crate::__tracing::field::Empty,
            turn.chars = $crate::__tracing::field::Empty,
            llm.stream_duration_ms = $crate::__tracing::field::Empty,
            error = $crate::__tracing::field::Empty,
            error.message = $crate::__tracing::field::Empty,
        )
    };
}

/// Span for a single provider call.
#[macro_export]
macro_rules! provider_span {
    ($provider:expr, $model:expr) => {
        $crate::__tracing::info_span!(
            "llm.request",
            llm.provider = %$provider,
            llm.model = %$model,
            error = $crate::__tracing::field::Empty,
            error.message = $crate::__tracing::field::Empty,
        )
    };
}

/// Mark the current span as failed and log the error.
pub fn record_error<E: std::error::Error + ?Sized>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::warn!(error = %error, "operation failed");
}

/// Record a duration in milliseconds on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
