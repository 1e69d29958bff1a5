//! OpenAI streaming support
//!
//! OpenAI uses SSE format with:
//! - `data: {"choices":[{"delta":{"content":"..."}}]}` for text deltas
//! - a trailing usage-only chunk when `stream_options.include_usage` is set
//! - `data: [DONE]` to signal stream end

use super::convert::{describe_error_body, parse_finish_reason};
use super::types::OpenAIStreamChunk;
use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerateStream, StreamEvent, Usage};
use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};

#[derive(Debug, Default)]
struct StreamState {
    id: Option<String>,
    usage: Usage,
    finish: Option<FinishReason>,
}

/// Create a stream from OpenAI EventSource
pub async fn create_stream(mut event_source: EventSource) -> Result<GenerateStream> {
    let stream = async_stream::stream! {
        let mut state = StreamState::default();

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    if message.data == "[DONE]" {
                        // Usage arrives after the finish_reason chunk, so the
                        // finish event is held until here.
                        if let Some(reason) = state.finish.take() {
                            yield Ok(StreamEvent::finish(state.usage, reason));
                        }
                        break;
                    }

                    match serde_json::from_str::<OpenAIStreamChunk>(&message.data) {
                        Ok(chunk) => {
                            for stream_event in process_chunk(chunk, &mut state) {
                                yield Ok(stream_event);
                            }
                        }
                        Err(e) => {
                            yield Err(Error::stream_error(format!(
                                "Failed to parse OpenAI chunk: {}", e
                            )));
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    if let Some(reason) = state.finish.take() {
                        yield Ok(StreamEvent::finish(state.usage, reason));
                    }
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "OpenAI API error {}: {}", status, describe_error_body(&error_body)
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

fn process_chunk(chunk: OpenAIStreamChunk, state: &mut StreamState) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if state.id.is_none() {
        let id = chunk
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        events.push(StreamEvent::start(id.clone()));
        state.id = Some(id);
    }
    let id = state.id.clone().unwrap_or_default();

    if let Some(usage) = chunk.usage {
        state.usage = Usage::new(usage.prompt_tokens, usage.completion_tokens);
    }

    for choice in chunk.choices {
        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::text_delta(id.clone(), content));
            }
        }
        if choice.finish_reason.is_some() {
            state.finish = Some(parse_finish_reason(choice.finish_reason.as_deref()));
        }
    }

    events
}
