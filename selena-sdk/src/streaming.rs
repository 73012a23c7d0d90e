//! Streaming support for the Selena API
//!
//! Streaming responses arrive as newline-delimited `data: <json>` frames. The whole
//! body is buffered by the transport and then handed to [`parse_event_stream`],
//! which pulls one token out of each frame, fires the token callback and
//! accumulates the full text.
//!
//! ```
//! use selena_sdk::streaming::parse_event_stream;
//! use selena_sdk::Logger;
//!
//! let body = "data: {\"response\":\"He\"}\ndata: {\"response\":\"llo\"}\ndata: [DONE]\n";
//! let text = parse_event_stream(body, None, &Logger::default());
//! assert_eq!(text, "Hello");
//! ```

use serde_json::Value;
use std::sync::Arc;

use crate::logger::Logger;

/// Callback invoked with each streamed token, in arrival order
pub type TokenCallback = Arc<dyn Fn(&str) + Send + Sync>;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Fields probed for a token, highest priority first
const TOKEN_FIELDS: [&str; 4] = ["response", "text", "content", "token"];

/// A single parsed `data:` frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Frame carrying a non-empty token
    Token(String),

    /// Frame without usable text (empty payload or no token field)
    Empty,

    /// The `[DONE]` terminator
    Done,
}

/// Parse one line of an event stream
///
/// Returns `None` for lines that are not `data:` frames. Frames whose JSON fails
/// to parse are returned as `Some(Err(_))` so the caller can decide to skip them.
pub fn parse_line(line: &str) -> Option<Result<StreamFrame, serde_json::Error>> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.trim();

    if payload.is_empty() {
        return Some(Ok(StreamFrame::Empty));
    }
    if payload == DONE_SENTINEL {
        return Some(Ok(StreamFrame::Done));
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return Some(Err(e)),
    };

    Some(Ok(match extract_token(&value) {
        Some(token) => StreamFrame::Token(token.to_string()),
        None => StreamFrame::Empty,
    }))
}

/// First non-empty string among `response`, `text`, `content`, `token`
pub fn extract_token(value: &Value) -> Option<&str> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|token| !token.is_empty())
}

/// Aggregate a fully buffered event-stream body into its text
///
/// Tokens are appended in line order and each one is passed to `on_token`
/// synchronously. Malformed frames are skipped and reported at debug level.
/// The returned text is trimmed.
pub fn parse_event_stream(body: &str, on_token: Option<&TokenCallback>, logger: &Logger) -> String {
    let mut full_response = String::new();

    for line in body.split('\n') {
        match parse_line(line) {
            Some(Ok(StreamFrame::Token(token))) => {
                full_response.push_str(&token);
                if let Some(callback) = on_token {
                    callback(&token);
                }
            }
            Some(Ok(StreamFrame::Empty | StreamFrame::Done)) | None => {}
            Some(Err(e)) => {
                logger.debug(format_args!("Failed to parse JSON line: {} ({})", line, e));
            }
        }
    }

    full_response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{LogLevel, LogSink};
    use parking_lot::Mutex;

    fn recorder() -> (TokenCallback, Arc<Mutex<Vec<String>>>) {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&tokens);
        let callback: TokenCallback = Arc::new(move |t: &str| captured.lock().push(t.to_string()));
        (callback, tokens)
    }

    #[test]
    fn test_aggregates_tokens_in_order() {
        let (callback, tokens) = recorder();
        let body = "data: {\"response\":\"He\"}\ndata: {\"response\":\"llo\"}\ndata: [DONE]\n";

        let text = parse_event_stream(body, Some(&callback), &Logger::default());

        assert_eq!(text, "Hello");
        assert_eq!(*tokens.lock(), vec!["He".to_string(), "llo".to_string()]);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let (callback, tokens) = recorder();
        let body = "data: {\"text\":\"a\"}\ndata: {not json\ndata: {\"text\":\"b\"}\n";

        let text = parse_event_stream(body, Some(&callback), &Logger::default());

        assert_eq!(text, "ab");
        assert_eq!(tokens.lock().len(), 2);
    }

    #[test]
    fn test_malformed_line_logged_at_debug() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let logger = Logger::with_sink(
            LogLevel::Debug,
            LogSink::callback(move |_, line| captured.lock().push(line.to_string())),
        );

        parse_event_stream("data: {oops\n", None, &logger);

        let lines = lines.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Failed to parse JSON line"));
    }

    #[test]
    fn test_token_field_priority() {
        let value = serde_json::json!({"token": "t", "content": "c", "text": "x", "response": "r"});
        assert_eq!(extract_token(&value), Some("r"));

        let value = serde_json::json!({"token": "t", "content": "c"});
        assert_eq!(extract_token(&value), Some("c"));

        // Empty strings fall through to the next field
        let value = serde_json::json!({"response": "", "token": "t"});
        assert_eq!(extract_token(&value), Some("t"));

        let value = serde_json::json!({"delta": "nope"});
        assert_eq!(extract_token(&value), None);
    }

    #[test]
    fn test_parse_line_variants() {
        assert!(parse_line("event: ping").is_none());
        assert!(parse_line("data:{\"response\":\"x\"}").is_none());
        assert!(matches!(parse_line("data: [DONE]"), Some(Ok(StreamFrame::Done))));
        assert!(matches!(parse_line("data: [DONE]\r"), Some(Ok(StreamFrame::Done))));
        assert!(matches!(parse_line("data:   "), Some(Ok(StreamFrame::Empty))));
        assert!(matches!(parse_line("data: {\"other\":1}"), Some(Ok(StreamFrame::Empty))));
        assert!(matches!(parse_line("data: nope"), Some(Err(_))));
        assert_eq!(
            parse_line("data: {\"content\":\"hi\"}").unwrap().unwrap(),
            StreamFrame::Token("hi".to_string())
        );
    }

    #[test]
    fn test_result_is_trimmed() {
        let body = "data: {\"response\":\"  spaced\"}\ndata: {\"response\":\" out \"}\n";
        let text = parse_event_stream(body, None, &Logger::default());
        assert_eq!(text, "spaced out");
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let (callback, tokens) = recorder();
        let body = ": keepalive\n\nevent: message\ndata: {\"response\":\"ok\"}\n";

        let text = parse_event_stream(body, Some(&callback), &Logger::default());

        assert_eq!(text, "ok");
        assert_eq!(tokens.lock().len(), 1);
    }
}
