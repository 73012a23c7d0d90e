//! Selena API client

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatApi;
use crate::error::{Result, SelenaError};
use crate::http::{bearer_value, build_http_client, HttpTransport, DEFAULT_TIMEOUT};
use crate::logger::{LogLevel, LogSink, Logger};
use crate::VERSION;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://elaxi.xyz";

const API_KEY_ENV: &str = "SELENA_API_KEY";
const BASE_URL_ENV: &str = "SELENA_BASE_URL";
const LOG_LEVEL_ENV: &str = "SELENA_LOG_LEVEL";

// ============================================================================
// Configuration
// ============================================================================

/// Resolved client configuration
///
/// Everything but the log level is fixed at construction. Changing the level
/// produces a new `ClientConfig` alongside a fresh set of components.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub log_level: LogLevel,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("log_level", &self.log_level)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Snapshot returned by [`Selena::info`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub log_level: LogLevel,
    pub version: &'static str,
}

/// Config plus the components built from it; replaced wholesale, never mutated
struct ClientState {
    config: ClientConfig,
    chat: Arc<ChatApi>,
}

// ============================================================================
// Client
// ============================================================================

/// Selena AI client
///
/// ```
/// use selena_sdk::{LogLevel, Selena};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Selena::builder()
///     .api_key("your-api-key")
///     .log_level(LogLevel::Error)
///     .build()?;
///
/// assert_eq!(client.info().log_level, LogLevel::Error);
/// # Ok(())
/// # }
/// ```
pub struct Selena {
    http_client: reqwest::Client,
    log_sink: LogSink,
    state: RwLock<Arc<ClientState>>,
}

impl std::fmt::Debug for Selena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selena")
            .field("config", &self.state.read().config)
            .field("log_sink", &self.log_sink)
            .finish()
    }
}

impl Selena {
    /// Create a new client with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client from `SELENA_API_KEY`
    ///
    /// `SELENA_BASE_URL` and `SELENA_LOG_LEVEL` are honored when set.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            builder = builder.api_key(api_key);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url);
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            builder = builder.log_level(level.parse()?);
        }

        builder.build()
    }

    /// Create a builder for more advanced configuration
    pub fn builder() -> SelenaBuilder {
        SelenaBuilder::new()
    }

    /// Get a handle to the currently live chat API
    ///
    /// The handle stays valid after [`Self::set_log_level`]; it simply keeps
    /// using the logger it was built with.
    pub fn chat(&self) -> Arc<ChatApi> {
        Arc::clone(&self.state.read().chat)
    }

    /// Current configuration
    pub fn config(&self) -> ClientConfig {
        self.state.read().config.clone()
    }

    /// Replace the logger, transport and chat API with ones built for `level`
    pub fn set_log_level(&self, level: LogLevel) {
        let config = ClientConfig {
            log_level: level,
            ..self.config()
        };
        let state = Arc::new(self.assemble(config));
        *self.state.write() = Arc::clone(&state);

        state
            .chat
            .logger()
            .info(format_args!("Log level updated {{\"newLevel\":\"{}\"}}", level));
    }

    /// Base URL, log level and SDK version
    pub fn info(&self) -> ClientInfo {
        let state = self.state.read();
        ClientInfo {
            base_url: state.config.base_url.clone(),
            log_level: state.config.log_level,
            version: VERSION,
        }
    }

    fn assemble(&self, config: ClientConfig) -> ClientState {
        assemble(&self.http_client, &self.log_sink, config)
    }
}

fn assemble(http_client: &reqwest::Client, sink: &LogSink, config: ClientConfig) -> ClientState {
    let logger = Arc::new(Logger::with_sink(config.log_level, sink.clone()));
    let http = HttpTransport::with_client(
        http_client.clone(),
        config.api_key.clone(),
        config.base_url.clone(),
        config.timeout,
        Arc::clone(&logger),
    );
    let chat = Arc::new(ChatApi::new(http, logger));

    ClientState { config, chat }
}

/// Builder for Selena client configuration
///
/// Create with [`Selena::builder()`]. The `api_key` is required.
#[derive(Default)]
pub struct SelenaBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    log_level: LogLevel,
    log_sink: LogSink,
    timeout: Option<Duration>,
}

impl SelenaBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom API base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the logging level (default: none)
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set where log lines are written (default: stdout)
    pub fn log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = sink;
        self
    }

    /// Set the request timeout (default: 30s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Selena> {
        let api_key = match self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(SelenaError::validation(
                    "API key is required. Get yours at https://elaxi.xyz/dashboard",
                    "apiKey",
                ))
            }
        };
        bearer_value(&api_key)?;

        let base_url = match self.base_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http_client = build_http_client(timeout)?;

        let config = ClientConfig {
            api_key,
            base_url,
            log_level: self.log_level,
            timeout,
        };
        let state = assemble(&http_client, &self.log_sink, config);

        state.chat.logger().info(format_args!(
            "Selena AI client initialized {{\"baseURL\":\"{}\",\"logLevel\":\"{}\"}}",
            state.config.base_url, state.config.log_level
        ));

        Ok(Selena {
            http_client,
            log_sink: self.log_sink,
            state: RwLock::new(Arc::new(state)),
        })
    }
}
