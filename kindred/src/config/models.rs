//! Configuration data models.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use crate::scheduler::SchedulerConfig;

/// Top-level configuration for the Kindred engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindredConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Daily reset scheduling configuration
    pub scheduler: SchedulerConfig,
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// Single-line output
    Compact,
    /// Structured JSON output
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to record
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Optional log file path. When set and `stdout` is false, log output
    /// goes to this file through a non-blocking writer.
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file: None,
            stdout: true,
        }
    }
}
