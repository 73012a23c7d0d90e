//! Chat completions API
//!
//! ```no_run
//! // Requires SELENA_API_KEY environment variable
//! use selena_sdk::{ChatRequest, Selena};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Selena::from_env()?;
//!
//! let response = client
//!     .chat()
//!     .completions(ChatRequest::new("Hello, Selena!"))
//!     .await?;
//! println!("{}", response.response);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::{Result, SelenaError};
use crate::http::{HttpTransport, RequestOptions};
use crate::logger::Logger;
use crate::streaming::TokenCallback;

/// Model used when the request does not name one
pub const DEFAULT_MODEL: &str = "selena-pro-v1";

/// Chat endpoint; the query marker tags SDK-originated traffic
const CHAT_ENDPOINT: &str = "/api/chat?skd=true";

// ============================================================================
// Request / Response Types
// ============================================================================

/// Parameters for a chat completion
#[derive(Clone, Default)]
pub struct ChatRequest {
    /// Model to use (default: `selena-pro-v1`)
    pub model: Option<String>,

    /// Prompt sent to the model (required, non-empty)
    pub message: String,

    /// Ask the server for an event-stream response
    pub stream: bool,

    /// Called with each token of a streamed response
    pub on_token: Option<TokenCallback>,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("model", &self.model)
            .field("message_length", &self.message.len())
            .field("stream", &self.stream)
            .field("on_token", &self.on_token.as_ref().map(|_| "Fn(&str)"))
            .finish()
    }
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Register a token callback; does not enable streaming by itself
    pub fn on_token<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_token = Some(Arc::new(callback));
        self
    }

    /// Build a request from untyped JSON parameters
    ///
    /// Accepts `{"message": string, "model"?: string, "stream"?: bool}`. Type
    /// mismatches are reported as validation errors naming the field.
    pub fn from_value(params: &Value) -> Result<Self> {
        let message = match params.get("message") {
            None | Some(Value::Null) => {
                return Err(SelenaError::validation(
                    "message parameter is required",
                    "message",
                ))
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(SelenaError::validation(
                    "message must be a string",
                    "message",
                ))
            }
        };

        let model = match params.get("model") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(SelenaError::validation("model must be a string", "model"));
            }
        };

        let stream = params.get("stream").map(is_truthy).unwrap_or(false);

        Ok(Self {
            model,
            message,
            stream,
            on_token: None,
        })
    }

    /// Model name sent on the wire; empty names fall back to the default
    pub fn model_or_default(&self) -> &str {
        match self.model.as_deref() {
            Some(model) if !model.is_empty() => model,
            _ => DEFAULT_MODEL,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(SelenaError::validation(
                "message parameter is required",
                "message",
            ));
        }
        Ok(())
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "model": self.model_or_default(),
            "message": self.message,
        });
        if self.stream {
            body["stream"] = Value::Bool(true);
        }
        body
    }
}

/// Chat completion result
///
/// For streamed responses `response` holds the aggregated tokens. For plain
/// responses the payload is kept as returned in `raw`; its string `response`
/// field and remaining object fields are lifted into `response` and `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Plain-mode payload exactly as received
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            extra: Map::new(),
            raw: None,
        }
    }

    /// Wrap any JSON payload; a missing or non-string `response` becomes ""
    pub fn from_payload(payload: Value) -> Self {
        let mut extra = match &payload {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let response = match extra.remove("response") {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };

        Self {
            response,
            extra,
            raw: Some(payload),
        }
    }
}

// ============================================================================
// Chat API
// ============================================================================

/// Chat API handle
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: HttpTransport,
    logger: Arc<Logger>,
}

impl ChatApi {
    pub fn new(http: HttpTransport, logger: Arc<Logger>) -> Self {
        Self { http, logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Create a chat completion
    ///
    /// Validation happens before any network activity. Non-success responses
    /// are classified by status code:
    ///
    /// - 401: [`SelenaError::Authentication`]
    /// - 429: [`SelenaError::Api`] with status 429
    /// - 400: [`SelenaError::Validation`] without a field
    /// - anything else: [`SelenaError::Api`] wrapping the original message
    ///
    /// Transport failures (timeouts, connection errors, bad JSON) pass through.
    pub async fn completions(&self, request: ChatRequest) -> Result<ChatResponse> {
        request.validate()?;

        self.logger.info(format_args!(
            "Creating chat completion {}",
            json!({
                "model": request.model_or_default(),
                "messageLength": request.message.encode_utf16().count(),
                "stream": request.stream,
            })
        ));

        let options = RequestOptions {
            stream: request.stream,
            on_token: request.on_token.clone(),
            ..RequestOptions::post(request.body())
        };

        match self.http.request(CHAT_ENDPOINT, options).await {
            Ok(response) => {
                self.logger.info("Chat completion created successfully");
                Ok(response)
            }
            Err(e) => {
                self.logger
                    .error(format_args!("Chat completion failed: {}", e));
                Err(classify_error(e))
            }
        }
    }
}

/// Map a transport failure onto the public error taxonomy
pub(crate) fn classify_error(error: SelenaError) -> SelenaError {
    let status = match &error {
        SelenaError::Http { status, .. } => *status,
        _ => return error,
    };

    match status {
        401 => SelenaError::Authentication {
            message: "Invalid API key or authentication failed".to_string(),
            status,
        },
        429 => SelenaError::Api {
            message: "Rate limit exceeded".to_string(),
            status: Some(status),
        },
        400 => SelenaError::Validation {
            message: "Invalid request parameters".to_string(),
            field: None,
        },
        _ => SelenaError::Api {
            message: format!("API request failed: {}", error),
            status: Some(status),
        },
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
