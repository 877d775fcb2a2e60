//! Error handling for notifykit
//!
//! Registration, removal and posting never fail. The error types here cover
//! the two places where something can go wrong:
//! - Observer handlers (returned or panicked failures)
//! - Bus configuration loading
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::any::Any;

use thiserror::Error;

use crate::token::ObserverToken;

/// Handler error type
///
/// Returned by an observer when it could not process a message. A panic
/// inside a handler is caught by the bus and converted to
/// [`HandlerError::Panicked`].
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler reported a failure
    #[error("Handler failed: {message}")]
    Failed {
        /// A message describing the failure.
        message: String,
    },

    /// Handler panicked while processing a message
    #[error("Handler panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },

    /// Error propagated from application code
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Create a [`HandlerError::Failed`] from any displayable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Convert a caught panic payload into [`HandlerError::Panicked`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { message }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
            HandlerError::Other(_) => "handler_error",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { message } => format!("failed: {message}"),
            HandlerError::Panicked { message } => format!("panicked: {message}"),
            HandlerError::Other(err) => format!("error: {err:#}"),
        }
    }

    /// True if this failure came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}

/// A handler failure observed during one `post` call.
#[derive(Debug)]
pub struct DeliveryFailure {
    /// Token of the observer that failed.
    pub token: ObserverToken,
    /// Observer name as reported by the handler.
    pub observer: String,
    /// What went wrong.
    pub error: HandlerError,
}

impl std::fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer '{}' ({}): {}", self.observer, self.token, self.error)
    }
}

/// Configuration and setup errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for notifykit operations
pub type Result<T> = std::result::Result<T, NotifyError>;
