//! Level-gated logger
//!
//! Every SDK component logs through a [`Logger`]. A message is emitted only when
//! its severity ranks at or below the logger's level, so `Info` also lets `Error`
//! messages through but drops `Debug`.
//!
//! ```
//! use selena_sdk::{LogLevel, Logger};
//!
//! let logger = Logger::new(LogLevel::Info);
//! assert!(logger.enabled(LogLevel::Error));
//! assert!(!logger.enabled(LogLevel::Debug));
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SelenaError;

/// Logging verbosity, ordered `None < Error < Info < Debug`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    None,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = SelenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(SelenaError::validation(
                format!(
                    "Invalid log level '{}': expected none, error, info or debug",
                    other
                ),
                "logLevel",
            )),
        }
    }
}

/// Callback receiving every emitted line
pub type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Where emitted lines go
#[derive(Clone, Default)]
pub enum LogSink {
    /// Print timestamped lines to standard output
    #[default]
    Stdout,

    /// Forward records to the `log` facade under the `selena` target
    Log,

    /// Hand timestamped lines to a user callback
    Callback(LogCallback),
}

impl LogSink {
    /// Convenience constructor for [`LogSink::Callback`]
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        LogSink::Callback(Arc::new(f))
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::Stdout => f.write_str("Stdout"),
            LogSink::Log => f.write_str("Log"),
            LogSink::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Synchronous, unbuffered logger gated by a [`LogLevel`]
#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    sink: LogSink,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::None)
    }
}

impl Logger {
    /// Create a logger printing to standard output
    pub fn new(level: LogLevel) -> Self {
        Self::with_sink(level, LogSink::Stdout)
    }

    pub fn with_sink(level: LogLevel, sink: LogSink) -> Self {
        Self { level, sink }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    /// Whether a message at `severity` would be emitted
    pub fn enabled(&self, severity: LogLevel) -> bool {
        severity != LogLevel::None && severity <= self.level
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Error, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Info, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Debug, message);
    }

    fn emit(&self, severity: LogLevel, message: impl fmt::Display) {
        if !self.enabled(severity) {
            return;
        }

        match &self.sink {
            LogSink::Stdout => println!("{}", format_line(severity, &message)),
            LogSink::Callback(callback) => callback(severity, &format_line(severity, &message)),
            LogSink::Log => {
                let level = match severity {
                    LogLevel::Error => log::Level::Error,
                    LogLevel::Info => log::Level::Info,
                    _ => log::Level::Debug,
                };
                log::log!(target: "selena", level, "{}", message);
            }
        }
    }
}

fn format_line(severity: LogLevel, message: &dyn fmt::Display) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("[{}] [Selena {}] {}", timestamp, severity.tag(), message)
}
