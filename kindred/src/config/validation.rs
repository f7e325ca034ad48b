//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::models::*;
use super::ConfigError;

/// Validate the entire configuration.
pub fn validate_config(config: &KindredConfig) -> Result<(), ConfigError> {
    validate_scheduler_config(&config.scheduler)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validate the scheduler configuration.
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))
}

/// Validate the logging configuration.
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if let Some(file) = &config.file {
        if file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log file path cannot be empty".to_string(),
            ));
        }
    }

    if config.file.is_none() && !config.stdout {
        return Err(ConfigError::ValidationError(
            "Logging must target stdout or a file".to_string(),
        ));
    }

    Ok(())
}
