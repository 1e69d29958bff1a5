//! Conversion between unified types and OpenAI types

use super::types::{OpenAIErrorWrapper, OpenAIMessage, OpenAIRequest, OpenAIStreamOptions};
use crate::error::{Error, Result};
use crate::types::{FinishReason, FinishReasonKind, GenerateRequest, Role};

/// Convert unified request to a streaming OpenAI request
pub fn to_openai_request(req: &GenerateRequest) -> Result<OpenAIRequest> {
    if req.messages.is_empty() {
        return Err(Error::invalid_request("OpenAI request needs at least one message"));
    }

    let messages = req
        .messages
        .iter()
        .map(|m| OpenAIMessage {
            role: match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .to_string(),
            content: Some(m.content.clone()),
        })
        .collect();

    Ok(OpenAIRequest {
        model: req.model.clone(),
        messages,
        temperature: req.options.temperature,
        max_tokens: req.options.max_tokens,
        stream: true,
        stream_options: OpenAIStreamOptions {
            include_usage: true,
        },
    })
}

/// Parse OpenAI finish reason
pub fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("stop") => FinishReason::with_raw(FinishReasonKind::Stop, "stop"),
        Some("length") => FinishReason::with_raw(FinishReasonKind::Length, "length"),
        Some("content_filter") => {
            FinishReason::with_raw(FinishReasonKind::ContentFilter, "content_filter")
        }
        Some(raw) => FinishReason::with_raw(FinishReasonKind::Other, raw),
        None => FinishReason::new(FinishReasonKind::Other),
    }
}

/// Prefer `error.message` from the JSON envelope over the raw body.
pub fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<OpenAIErrorWrapper>(body)
        .map(|w| match w.error.type_ {
            Some(kind) => format!("{}: {}", kind, w.error.message),
            None => w.error.message,
        })
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_stream_request_shape() {
        let req = GenerateRequest::new(
            "gpt-test",
            vec![Message::system("sys"), Message::user("hi"), Message::assistant("yo")],
        )
        .with_max_tokens(100);

        let json = serde_json::to_value(to_openai_request(&req).unwrap()).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][2]["role"], "assistant");
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);
        assert_eq!(json["max_tokens"], 100);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_empty_request_rejected() {
        let req = GenerateRequest::new("gpt-test", vec![]);
        assert!(matches!(to_openai_request(&req), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_parse_finish_reason() {
        assert_eq!(parse_finish_reason(Some("stop")).unified, FinishReasonKind::Stop);
        assert_eq!(parse_finish_reason(Some("length")).unified, FinishReasonKind::Length);
        let other = parse_finish_reason(Some("tool_calls"));
        assert_eq!(other.unified, FinishReasonKind::Other);
        assert_eq!(other.raw.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn test_describe_error_body() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            describe_error_body(body),
            "invalid_request_error: Incorrect API key provided"
        );
    }
}
