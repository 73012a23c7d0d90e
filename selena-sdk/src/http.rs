//! HTTP transport
//!
//! A single request function shared by every API handle. It attaches bearer
//! authentication, enforces the request timeout, decides between plain JSON and
//! event-stream parsing, and logs the exchange at debug level.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chat::ChatResponse;
use crate::error::{Result, SelenaError};
use crate::logger::{LogLevel, Logger};
use crate::streaming::{parse_event_stream, TokenCallback};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of characters of a raw stream body shown in debug logs
const STREAM_PREVIEW_CHARS: usize = 200;

/// Options for a single transport request
#[derive(Clone)]
pub struct RequestOptions {
    /// HTTP method (default: GET)
    pub method: Method,

    /// Extra headers, overriding the defaults on conflict
    pub headers: HeaderMap,

    /// JSON body, if any
    pub body: Option<Value>,

    /// Treat a successful response as an event stream regardless of its content type
    pub stream: bool,

    /// Called with each token when the response is parsed as a stream
    pub on_token: Option<TokenCallback>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            stream: false,
            on_token: None,
        }
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("stream", &self.stream)
            .field("on_token", &self.on_token.as_ref().map(|_| "Fn(&str)"))
            .finish()
    }
}

impl RequestOptions {
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Default::default()
        }
    }
}

/// HTTP transport bound to one API key, base URL and logger
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    logger: Arc<Logger>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("log_level", &self.logger.level())
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport with its own reqwest client
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        logger: Arc<Logger>,
    ) -> Result<Self> {
        let client = build_http_client(timeout)?;
        Ok(Self::with_client(client, api_key, base_url, timeout, logger))
    }

    /// Create a transport sharing an existing reqwest client
    pub(crate) fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout,
            logger,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Send a request to `endpoint` (a path relative to the base URL)
    ///
    /// Errors are logged at error level and returned unchanged. Non-success
    /// responses come back as [`SelenaError::Http`] with the numeric status.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ChatResponse> {
        let result = self.execute(endpoint, options).await;
        if let Err(e) = &result {
            self.logger.error(format_args!("Request failed: {}", e));
        }
        result
    }

    async fn execute(&self, endpoint: &str, options: RequestOptions) -> Result<ChatResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start = Instant::now();

        self.logger
            .debug(format_args!("→ {} {}", options.method, url));
        if let Some(body) = &options.body {
            self.logger.debug(format_args!("Body: {}", body));
        }

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(self.build_headers(&options.headers)?);
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SelenaError::from_reqwest_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = canonical_reason(status);
            let body = match response.text().await {
                Ok(text) => text,
                Err(_) => status_text.clone(),
            };
            return Err(SelenaError::Http {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        let streaming = options.stream || is_stream_content_type(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| SelenaError::from_reqwest_error(e, self.timeout))?;

        let data = if streaming {
            if self.logger.enabled(LogLevel::Debug) {
                let preview: String = text.chars().take(STREAM_PREVIEW_CHARS).collect();
                self.logger
                    .debug(format_args!("Raw streaming response: {}...", preview));
            }
            ChatResponse::new(parse_event_stream(
                &text,
                options.on_token.as_ref(),
                &self.logger,
            ))
        } else {
            ChatResponse::from_payload(serde_json::from_str::<Value>(&text)?)
        };

        self.logger.debug(format_args!(
            "← {} ({}ms)",
            status.as_u16(),
            start.elapsed().as_millis()
        ));
        if self.logger.enabled(LogLevel::Debug) {
            let payload = match &data.raw {
                Some(raw) => raw.to_string(),
                None => serde_json::to_string(&data)?,
            };
            self.logger.debug(format_args!("Response: {}", payload));
        }

        Ok(data)
    }

    fn build_headers(&self, overrides: &HeaderMap) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(AUTHORIZATION, bearer_value(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in overrides {
            headers.insert(name.clone(), value.clone());
        }

        Ok(headers)
    }
}

/// Build the underlying reqwest client with the given timeout
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SelenaError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Bearer authorization header for `api_key`
pub(crate) fn bearer_value(api_key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
        SelenaError::validation("API key contains invalid header characters", "apiKey")
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn is_stream_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/plain") || ct.contains("text/event-stream"))
        .unwrap_or(false)
}

fn canonical_reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
