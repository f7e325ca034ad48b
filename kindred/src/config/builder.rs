//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{models::*, validation, Result};

/// Builder for creating KindredConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: KindredConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: KindredConfig::default(),
        }
    }

    /// Shorthand for a validated default configuration.
    pub fn defaults() -> Self {
        Self::new()
    }

    /// Set the wall-clock time the daily reset fires.
    pub fn with_reset_time(mut self, hour: u8, minute: u8) -> Self {
        self.config.scheduler.reset_hour = hour;
        self.config.scheduler.reset_minute = minute;
        self
    }

    /// Set the UTC offset (in minutes) the reset time is interpreted in.
    pub fn with_utc_offset_minutes(mut self, offset_minutes: i32) -> Self {
        self.config.scheduler.utc_offset_minutes = offset_minutes;
        self
    }

    /// Replace the whole scheduler configuration.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    /// Set the minimum log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log output format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Send log output to a file instead of stdout.
    pub fn with_log_file<P: Into<std::path::PathBuf>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.into());
        self.config.logging.stdout = false;
        self
    }

    /// Validate and produce the final configuration.
    pub fn build(self) -> Result<KindredConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
