//! SSE fixture helpers for integration tests.

#![allow(dead_code)]

use wiremock::ResponseTemplate;

// Load fixture templates at compile time
pub const SSE_CHAT: &str = include_str!("fixtures/sse_chat_response.sse");
pub const SSE_THINKING: &str = include_str!("fixtures/sse_thinking_response.sse");

/// Create a content-only SSE stream with the given text.
pub fn chat_sse(text: &str) -> String {
    SSE_CHAT.replace("{{TEXT}}", &escape_json(text))
}

/// Create an SSE stream with a thinking delta followed by content.
pub fn thinking_sse(thinking: &str, text: &str) -> String {
    SSE_THINKING
        .replace("{{THINKING}}", &escape_json(thinking))
        .replace("{{TEXT}}", &escape_json(text))
}

/// Wrap SSE body string in a ResponseTemplate.
pub fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

/// Convenience: content SSE wrapped in ResponseTemplate.
pub fn chat_response(text: &str) -> ResponseTemplate {
    sse_response(&chat_sse(text))
}

/// Escape special characters for JSON string embedding.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_sse_substitution() {
        let result = chat_sse("Hello, world!");
        assert!(result.contains(r#""content":"Hello, world!""#));
        assert!(result.contains("data: [DONE]"));
    }

    #[test]
    fn test_thinking_sse_substitution() {
        let result = thinking_sse("pondering", "done");
        assert!(result.contains(r#""thinking":"pondering""#));
        assert!(result.contains(r#""content":"done""#));
    }

    #[test]
    fn test_escape_json_handles_newlines_and_quotes() {
        let result = chat_sse("line one\nsay \"hi\"");
        assert!(result.contains(r#"line one\nsay \"hi\""#));
    }
}
