//! Structured logging infrastructure for Kindred.
//!
//! This module provides a configurable logging system based on the tracing
//! crate, supporting different output formats and destinations.

use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

use crate::config::{LogFormat, LogLevel, LoggingConfig};

/// Keeps the non-blocking file writer's worker alive for the process
/// lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),

    /// General error
    Other(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(err) => write!(f, "IO error: {}", err),
            LogError::SubscriberError(err) => write!(f, "Subscriber setup error: {}", err),
            LogError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

impl From<tracing_subscriber::util::TryInitError> for LogError {
    fn from(err: tracing_subscriber::util::TryInitError) -> Self {
        LogError::SubscriberError(Box::new(err))
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// Installing over an already-set global subscriber is tolerated so that
/// tests and embedding applications can call this freely.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = match config.level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    };

    let result = match config.format {
        LogFormat::Json => init_json_logging(level, config),
        LogFormat::Compact => init_compact_logging(level, config),
        LogFormat::Pretty => init_pretty_logging(level, config),
    };

    // If the error is "already set", ignore it
    if let Err(LogError::SubscriberError(ref e)) = result {
        if e.to_string().contains("has already been set") {
            return Ok(());
        }
    }

    result
}

/// Initialize logging with JSON formatting
fn init_json_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_level(true)
        .with_target(true);

    if let Some(file_path) = &config.file {
        let writer = create_non_blocking_file(file_path)?;
        subscriber.with_writer(writer).try_init()?;
    } else if config.stdout {
        subscriber.try_init()?;
    }

    Ok(())
}

/// Initialize logging with compact formatting
fn init_compact_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_level(true)
        .with_target(true);

    if let Some(file_path) = &config.file {
        let writer = create_non_blocking_file(file_path)?;
        subscriber.with_writer(writer).try_init()?;
    } else if config.stdout {
        subscriber.try_init()?;
    }

    Ok(())
}

/// Initialize logging with pretty formatting
fn init_pretty_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(level)
        .with_level(true)
        .with_target(true);

    if let Some(file_path) = &config.file {
        let writer = create_non_blocking_file(file_path)?;
        subscriber.with_writer(writer).try_init()?;
    } else if config.stdout {
        subscriber.try_init()?;
    }

    Ok(())
}

/// Create a non-blocking writer appending to the given file, parking the
/// worker guard for the process lifetime.
fn create_non_blocking_file(path: &Path) -> Result<NonBlocking> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
