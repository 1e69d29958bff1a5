//! Conversion between unified types and Gemini types

use super::types::{
    GeminiCandidate, GeminiContent, GeminiErrorWrapper, GeminiGenerationConfig, GeminiRequest,
};
use crate::error::{Error, Result};
use crate::types::{FinishReason, FinishReasonKind, GenerateRequest, Role};

/// Convert a unified request into a Gemini request body.
///
/// System messages are folded into `systemInstruction`; assistant turns are
/// sent with the `model` role.
pub fn to_gemini_request(req: &GenerateRequest) -> Result<GeminiRequest> {
    let contents: Vec<GeminiContent> = req
        .messages
        .iter()
        .filter_map(|m| match m.role {
            Role::System => None,
            Role::User => Some(GeminiContent::text(Some("user"), m.content.clone())),
            Role::Assistant => Some(GeminiContent::text(Some("model"), m.content.clone())),
        })
        .collect();

    if contents.is_empty() {
        return Err(Error::invalid_request(
            "Gemini request needs at least one user or assistant message",
        ));
    }

    let system_instruction = req
        .system_prompt()
        .map(|text| GeminiContent::text(None, text));

    let generation_config =
        if req.options.temperature.is_some() || req.options.max_tokens.is_some() {
            Some(GeminiGenerationConfig {
                temperature: req.options.temperature,
                max_output_tokens: req.options.max_tokens,
            })
        } else {
            None
        };

    Ok(GeminiRequest {
        contents,
        system_instruction,
        generation_config,
    })
}

/// Concatenate the answer text of a candidate, skipping thought summaries.
pub fn candidate_text(candidate: &GeminiCandidate) -> String {
    candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter(|p| !p.thought.unwrap_or(false))
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Map Gemini's `finishReason` onto the unified kind.
pub fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    let Some(raw) = reason else {
        return FinishReason::new(FinishReasonKind::Other);
    };
    let unified = match raw {
        "STOP" => FinishReasonKind::Stop,
        "MAX_TOKENS" => FinishReasonKind::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReasonKind::ContentFilter
        }
        _ => FinishReasonKind::Other,
    };
    FinishReason::with_raw(unified, raw)
}

/// Human-readable message from a non-2xx body, preferring the error envelope.
pub fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<GeminiErrorWrapper>(body)
        .map(|wrapper| {
            let status = wrapper.error.status.unwrap_or_default();
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status.is_empty() {
                message
            } else {
                format!("{}: {}", status, message)
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_roles_and_system_instruction() {
        let req = GenerateRequest::new(
            "gemini-test",
            vec![
                Message::system("You are an analyst."),
                Message::user("hello"),
                Message::assistant("hi there"),
                Message::user("numbers?"),
            ],
        )
        .with_temperature(0.7);

        let body = to_gemini_request(&req).unwrap();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "numbers?");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are an analyst."
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_no_generation_config_without_options() {
        let req = GenerateRequest::new("m", vec![Message::user("hi")]);
        let json = serde_json::to_value(to_gemini_request(&req).unwrap()).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_system_only_request_rejected() {
        let req = GenerateRequest::new("m", vec![Message::system("only system")]);
        let err = to_gemini_request(&req).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_candidate_text_skips_thoughts() {
        let candidate: GeminiCandidate = serde_json::from_value(serde_json::json!({
            "content": {"role": "model", "parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Margins look "},
                {"text": "healthy."}
            ]},
            "finishReason": "STOP"
        }))
        .unwrap();

        assert_eq!(candidate_text(&candidate), "Margins look healthy.");
    }

    #[test]
    fn test_candidate_without_content_has_no_text() {
        let candidate: GeminiCandidate =
            serde_json::from_value(serde_json::json!({"finishReason": "SAFETY"})).unwrap();
        assert_eq!(candidate_text(&candidate), "");
    }

    #[test]
    fn test_parse_finish_reason() {
        assert_eq!(parse_finish_reason(Some("STOP")).unified, FinishReasonKind::Stop);
        assert_eq!(
            parse_finish_reason(Some("MAX_TOKENS")).unified,
            FinishReasonKind::Length
        );
        assert_eq!(
            parse_finish_reason(Some("SAFETY")).unified,
            FinishReasonKind::ContentFilter
        );
        let other = parse_finish_reason(Some("MALFORMED_FUNCTION_CALL"));
        assert_eq!(other.unified, FinishReasonKind::Other);
        assert_eq!(other.raw.as_deref(), Some("MALFORMED_FUNCTION_CALL"));
        assert!(parse_finish_reason(None).raw.is_none());
    }

    #[test]
    fn test_describe_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(describe_error_body(body), "INVALID_ARGUMENT: API key not valid.");
        assert_eq!(describe_error_body("plain failure"), "plain failure");
    }
}
