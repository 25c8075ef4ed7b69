//! Error types for citypulse-core
//!
//! This module provides error types and user-friendly error formatting.

use std::time::Duration;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Remote call failed (transport or non-success response)
    #[error("remote error: {0}")]
    Remote(#[from] citypulse_remote::Error),

    /// Remote answered with an explicit structured failure
    #[error("rejected: {0}")]
    Rejected(String),

    /// An operation exceeded its wall-clock budget
    #[error("{operation} timed out after {secs}s", secs = .budget.as_secs())]
    Timeout {
        /// What was being waited for
        operation: &'static str,
        /// Budget that elapsed
        budget: Duration,
    },

    /// Client-side precondition unmet; no remote call was made
    #[error("validation error: {0}")]
    Validation(String),

    /// Destructive operation attempted without confirmation
    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    /// Storage tier read/write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not valid in the component's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages and suggestions for fixing.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Remote(e) if e.is_transport() => {
                format!("🌐 Could not reach the backend: {}", e)
            }
            Error::Remote(citypulse_remote::Error::Api { status, message }) => {
                format!("🛰️ Backend returned {}: {}", status, message)
            }
            Error::Remote(e) => format!("🛰️ Backend error: {}", e),
            Error::Rejected(msg) => format!("🚫 Request rejected: {}", msg),
            Error::Timeout { operation, budget } => {
                format!(
                    "⏳ {} did not finish within {} seconds.",
                    operation,
                    budget.as_secs()
                )
            }
            Error::Validation(msg) => format!("📝 {}", msg),
            Error::ConfirmationRequired(what) => {
                format!("✋ Confirmation required before {}.", what)
            }
            Error::Storage(msg) => format!("💾 Storage error: {}", msg),
            Error::Serialization(e) => format!("❌ Could not encode data: {}", e),
            Error::InvalidState(msg) => format!("⚠️ {}", msg),
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Remote(e) if e.is_transport() => Some(
                "💡 Check that the backend is running and CITYPULSE_API_URL points at it."
                    .to_string(),
            ),
            Error::Timeout { .. } => {
                Some("💡 The data will be retried on the next refresh.".to_string())
            }
            Error::ConfirmationRequired(_) => {
                Some("💡 Re-run the command with --yes to confirm.".to_string())
            }
            Error::Configuration(_) => {
                Some("💡 Check config/default.toml or CITYPULSE_* environment variables.".to_string())
            }
            Error::InvalidState(_) => Some("💡 Activate a city first.".to_string()),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = String::new();

    output.push_str(&error.user_message());
    output.push('\n');

    if let Some(suggestion) = error.suggestion() {
        output.push('\n');
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests;
