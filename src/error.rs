//! Error types for trailpager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Only upstream failures (record source, file and parse errors) ever reach
//! the caller of `PaginationEngine::paginate`. Malformed positional hints and
//! invalid configuration are recovered from inside the engine.

use thiserror::Error;

/// The main error type for trailpager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Positional Hint Errors
    // ============================================================================
    #[error("Malformed cursor: {message}")]
    MalformedCursor { message: String },

    // ============================================================================
    // Record Source Errors
    // ============================================================================
    #[error("Record source failed: {message}")]
    Source { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed cursor error
    pub fn malformed_cursor(message: impl Into<String>) -> Self {
        Self::MalformedCursor {
            message: message.into(),
        }
    }

    /// Create a record source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Check if this error originated upstream of the engine
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Source { .. } | Error::Io(_) | Error::FileNotFound { .. } | Error::JsonParse(_)
        )
    }

    /// Check if the engine recovers from this error on its own
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedCursor { .. } | Error::Config { .. } | Error::InvalidConfigValue { .. }
        )
    }
}

/// Result type alias for trailpager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_value("max_page_size", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'max_page_size': must be at least 1"
        );

        let err = Error::malformed_cursor("bad base64");
        assert_eq!(err.to_string(), "Malformed cursor: bad base64");

        let err = Error::source("connection reset");
        assert_eq!(err.to_string(), "Record source failed: connection reset");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::source("down").is_upstream());
        assert!(Error::Io(std::io::Error::other("disk")).is_upstream());
        assert!(!Error::source("down").is_recoverable());

        assert!(Error::malformed_cursor("x").is_recoverable());
        assert!(Error::config("x").is_recoverable());
        assert!(Error::invalid_value("f", "x").is_recoverable());
        assert!(!Error::malformed_cursor("x").is_upstream());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
