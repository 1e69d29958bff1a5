//! Gemini streaming support
//!
//! `streamGenerateContent?alt=sse` sends one full `GenerateContentResponse`
//! per SSE `data:` line. There is no terminal marker; the server closes the
//! stream after the chunk carrying `finishReason`.

use super::convert::{candidate_text, describe_error_body, parse_finish_reason};
use super::types::GeminiResponse;
use crate::error::{Error, Result};
use crate::types::{GenerateStream, StreamEvent, Usage};
use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};

/// Per-stream bookkeeping carried between chunks.
#[derive(Debug, Default)]
struct StreamState {
    id: Option<String>,
    usage: Usage,
}

/// Create a stream from a Gemini EventSource
pub async fn create_stream(mut event_source: EventSource) -> Result<GenerateStream> {
    let stream = async_stream::stream! {
        let mut state = StreamState::default();

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    if message.data.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<GeminiResponse>(&message.data) {
                        Ok(chunk) => {
                            let mut failed = false;
                            for stream_event in process_chunk(chunk, &mut state) {
                                failed |= matches!(stream_event, StreamEvent::Error { .. });
                                yield Ok(stream_event);
                            }
                            if failed {
                                break;
                            }
                        }
                        Err(e) => {
                            yield Err(Error::stream_error(format!(
                                "Failed to parse Gemini chunk: {}", e
                            )));
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "Gemini API error {}: {}", status, describe_error_body(&error_body)
                    )));
                    break;
                }
                Err(e) => {
                    yield Err(Error::stream_error(format!("Stream error: {}", e)));
                    break;
                }
            }
        }

        event_source.close();
    };

    Ok(GenerateStream::new(Box::pin(stream)))
}

/// Turn one SSE chunk into unified events.
fn process_chunk(chunk: GeminiResponse, state: &mut StreamState) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if state.id.is_none() {
        let id = chunk
            .response_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        events.push(StreamEvent::start(id.clone()));
        state.id = Some(id);
    }
    let id = state.id.clone().unwrap_or_default();

    if let Some(meta) = chunk.usage_metadata {
        state.usage = Usage::new(meta.prompt_token_count, meta.candidates_token_count);
    }

    let Some(candidate) = chunk.candidates.first() else {
        if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
            events.push(StreamEvent::error(format!("prompt blocked: {}", reason)));
        }
        return events;
    };

    let text = candidate_text(candidate);
    if !text.is_empty() {
        events.push(StreamEvent::text_delta(id, text));
    }

    if candidate.finish_reason.is_some() {
        events.push(StreamEvent::finish(
            state.usage,
            parse_finish_reason(candidate.finish_reason.as_deref()),
        ));
    }

    events
}
