//! Error types for tap-netsuite
//!
//! This module defines the error hierarchy for the whole connector.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-netsuite
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    // ============================================================================
    // WSDL / Type Registry Errors
    // ============================================================================
    #[error("Type {type_name} not found in WSDL")]
    TypeNotFound { type_name: String },

    #[error("Failed to parse XML: {message}")]
    XmlParse { message: String },

    #[error("Schema inference failed: {message}")]
    SchemaInference { message: String },

    // ============================================================================
    // SOAP API Errors
    // ============================================================================
    /// Vendor status code in the known-transient set. Safe to retry.
    #[error("{code} (retryable) error: \"{message}\"")]
    RetryableApi { code: String, message: String },

    /// Any other unsuccessful vendor status. Never retried.
    #[error("{code} error: \"{message}\"")]
    FatalApi { code: String, message: String },

    #[error("Malformed SOAP envelope: {message}")]
    Envelope { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

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

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a type-not-found error
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create an XML parse error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Create a malformed-envelope error
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }

    /// Create a retryable API error from a vendor status detail
    pub fn retryable_api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RetryableApi {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a fatal API error from a vendor status detail
    pub fn fatal_api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FatalApi {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only transient vendor statuses qualify; fatal API errors and
    /// transport failures propagate immediately and abort the current
    /// stream's extraction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RetryableApi { .. })
    }
}

/// Result type alias for tap-netsuite
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
