//! Custom error types for the application.
//!
//! Errors here are setup-time failures only: configuration parsing and
//! validation, logger installation, and loading the vendor library. Per-call
//! reads from the vendor library never error; a failed read degrades to an
//! empty or zero value at the driver layer instead.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, DashError>;

/// Application error type.
#[derive(Error, Debug)]
pub enum DashError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger setup error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Driver library error: {0}")]
    Driver(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashError::Driver("symbol not found".to_string());
        assert_eq!(err.to_string(), "Driver library error: symbol not found");
    }

    #[test]
    fn test_validation_error_display() {
        let err = DashError::Configuration("poll_interval_ms must be non-zero".to_string());
        assert!(err.to_string().contains("poll_interval_ms"));
    }
}
