//! Error types for notewise.
//!
//! Two layers live here. [`AiError`] is the classified failure produced when
//! an AI provider call fails: it carries an [`ErrorKind`], a retry flag that is
//! fixed at classification time, and the upstream HTTP status when there was
//! one. [`Error`] is the crate-wide error enum that wraps it alongside
//! configuration and input errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using notewise's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Taxonomy of classified AI failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Host unreachable or connection refused.
    Network,
    /// The provider answered with an error, or failed in an unexpected way.
    Api,
    /// Bad or missing configuration detected before any call was made.
    Validation,
    /// The provider throttled the request (HTTP 429).
    RateLimit,
    /// The request did not complete before its deadline.
    Timeout,
}

impl ErrorKind {
    /// Stable lowercase identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Api => "api",
            Self::Validation => "validation",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified AI service failure.
///
/// Created once at the point the failure is detected and never mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct AiError {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl AiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            status_code: None,
        }
    }

    /// Attach the upstream HTTP status.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Non-retryable validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, false)
    }

    /// Retryable deadline failure.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message, true)
    }
}

/// Core error type for notewise operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Classified AI provider failure
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Provider name not recognised by the service factory
    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure injected by the simulated provider
    #[error("{0}")]
    Simulated(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The classified error, if this is one.
    pub fn as_ai(&self) -> Option<&AiError> {
        match self {
            Error::Ai(e) => Some(e),
            _ => None,
        }
    }

    /// Only classified errors flagged retryable are eligible for another attempt.
    pub fn is_retryable(&self) -> bool {
        self.as_ai().is_some_and(|e| e.retryable)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
