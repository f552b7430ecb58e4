//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout staffdesk.
//! Every error maps to a stable error code so log lines and user messages stay consistent.
//!
//! # Error Categories
//! - `ConnectionFailed`: The database could not be reached
//! - `QueryFailed`: A statement failed (constraint violation, lost connection, bad value)
//! - `InvalidInput`: Nothing to select, or a value that cannot be used
//! - `ConfigError`: Missing or malformed connection settings
//! - `PromptFailed`: The terminal prompt could not be shown or answered
//! - `OutputFailed`: Rows could not be rendered in the requested format
//!
//! A delete refused because of dependent rows is not an error; see
//! [`crate::store::integrity::DeleteOutcome`].

use thiserror::Error;

/// Main error type for staffdesk operations
#[derive(Error, Debug)]
pub enum StaffdeskError {
    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Invalid input or nothing to choose from
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (missing environment variable, bad port, etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Terminal interaction failed
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    /// Listing could not be rendered
    #[error("Output rendering failed: {0}")]
    OutputFailed(String),
}

impl StaffdeskError {
    /// Convert error to error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::PromptFailed(_) => "PROMPT_FAILED",
            Self::OutputFailed(_) => "OUTPUT_FAILED",
        }
    }

    /// Get human-readable error message (never contains credentials)
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a prompt failure error
    pub fn prompt_failed(message: impl Into<String>) -> Self {
        Self::PromptFailed(message.into())
    }

    /// Create an output rendering error
    pub fn output_failed(message: impl Into<String>) -> Self {
        Self::OutputFailed(message.into())
    }

    /// Whether the session can keep going after this error
    ///
    /// A broken terminal cannot show the next menu, everything else can.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::PromptFailed(_))
    }
}

/// Result type alias for staffdesk operations
pub type Result<T> = std::result::Result<T, StaffdeskError>;
