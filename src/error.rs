//! Error types for subtrack
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for subtrack
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Malformed or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A config field holds a value outside its allowed range
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue {
        /// Dotted path of the field
        field: String,
        /// Why the value was rejected
        message: String,
    },

    /// YAML parse failure
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parse failure
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Page Source Errors
    // ============================================================================
    /// A page source failed with an opaque message
    #[error("{message}")]
    Fetch {
        /// Message surfaced in the error state
        message: String,
    },

    /// Page number below 1
    #[error("Invalid page {page}: pages are numbered from 1")]
    InvalidPage {
        /// The rejected page number
        page: u32,
    },

    /// Transport-level HTTP failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Unparsable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Paginator Errors
    // ============================================================================
    /// The intent queue is at capacity
    #[error("Action queue is full, intent dropped")]
    QueueFull,

    /// The worker has stopped
    #[error("Paginator has shut down")]
    Closed,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing file
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was looked up
        path: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Error with added context
    #[error("{0}")]
    Other(String),

    /// Any other error, passed through
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
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

    /// Create a fetch error carrying an opaque, displayable message
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error means the paginator can no longer accept intents
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}

/// Result type alias for subtrack
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
