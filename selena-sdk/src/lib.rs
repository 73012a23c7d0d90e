//! Client library for the Selena AI chat API
//!
//! This crate wraps the Selena chat completion endpoint. It validates requests,
//! classifies failures into typed errors, optionally logs the HTTP exchange and
//! delivers streamed tokens through a callback.
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires SELENA_API_KEY environment variable
//! use selena_sdk::{ChatRequest, Selena};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Selena::from_env()?;
//!
//! let request = ChatRequest::new("Hello, Selena!").model("selena-pro-v1");
//! let response = client.chat().completions(request).await?;
//! println!("{}", response.response);
//! # Ok(())
//! # }
//! ```
//!
//! # Streaming Responses
//!
//! With `stream(true)` the server answers with `data:` frames. Each token is
//! handed to the callback as it is parsed, and the aggregated text is returned:
//!
//! ```no_run
//! // Requires SELENA_API_KEY environment variable
//! use selena_sdk::{ChatRequest, Selena};
//! use std::io::Write;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Selena::from_env()?;
//!
//! let request = ChatRequest::new("Tell me a story")
//!     .stream(true)
//!     .on_token(|token| {
//!         print!("{}", token);
//!         let _ = std::io::stdout().flush();
//!     });
//!
//! let response = client.chat().completions(request).await?;
//! println!("\n{} chars", response.response.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every error exposes a [`ErrorKind`] plus an optional status and field:
//!
//! ```no_run
//! use selena_sdk::{ChatRequest, ErrorKind, Selena};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Selena::new("your-api-key")?;
//!
//! match client.chat().completions(ChatRequest::new("Hi")).await {
//!     Ok(response) => println!("{}", response.response),
//!     Err(e) if e.kind() == ErrorKind::Authentication => eprintln!("check your key"),
//!     Err(e) if e.is_rate_limited() => eprintln!("slow down"),
//!     Err(e) => eprintln!("failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! ```
//! use selena_sdk::{LogLevel, LogSink, Selena};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Selena::builder()
//!     .api_key("your-api-key")
//!     .log_level(LogLevel::Info)
//!     .log_sink(LogSink::Log)
//!     .build()?;
//!
//! // Rebuilds the logger, transport and chat API
//! client.set_log_level(LogLevel::Debug);
//! # Ok(())
//! # }
//! ```

pub mod chat;
mod client;
mod error;
pub mod http;
pub mod logger;
pub mod streaming;

/// SDK version reported by [`Selena::info`]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Client types
pub use client::{ClientConfig, ClientInfo, Selena, SelenaBuilder, DEFAULT_BASE_URL};

// Error types
pub use error::{ErrorKind, Result, SelenaError};

// Chat
pub use chat::{ChatApi, ChatRequest, ChatResponse, DEFAULT_MODEL};

// Transport
pub use http::{HttpTransport, RequestOptions, DEFAULT_TIMEOUT};

// Logging
pub use logger::{LogCallback, LogLevel, LogSink, Logger};

// Streaming
pub use streaming::TokenCallback;
