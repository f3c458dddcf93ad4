//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CarCare
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CarCareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CarCare operations
pub type Result<T> = std::result::Result<T, CarCareError>;

/// Terminal failure of one calendar authorization attempt.
///
/// None of these are retried automatically. The authorization code is
/// single-use and the popup is gone by the time any of them is reported, so
/// the caller always has to start a fresh attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum HandshakeError {
    #[error("Invalid maintenance draft: {0}")]
    InvalidDraft(String),

    #[error("Could not obtain an authorization URL: {0}")]
    UrlRequestFailed(String),

    #[error("Popup was blocked: {0}")]
    PopupBlocked(String),

    #[error("Authorization denied: {reason}")]
    Denied { reason: String },

    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Calendar event submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Authorization cancelled")]
    Cancelled,

    #[error("Authorization timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("Authorization window was closed before completing")]
    Abandoned,
}

impl HandshakeError {
    /// Stable label suitable for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidDraft(_) => "invalid_draft",
            Self::UrlRequestFailed(_) => "url_request_failed",
            Self::PopupBlocked(_) => "popup_blocked",
            Self::Denied { .. } => "denied",
            Self::ExchangeFailed(_) => "exchange_failed",
            Self::SubmissionFailed(_) => "submission_failed",
            Self::Cancelled => "cancelled",
            Self::TimedOut { .. } => "timed_out",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the caller has to begin a new authorization to make progress.
    ///
    /// Always true: there is no partial resume of an attempt.
    pub fn requires_restart(&self) -> bool {
        true
    }

    /// Whether the failure happened after the authorization code was granted,
    /// i.e. the code has been (or may have been) consumed.
    pub fn code_consumed(&self) -> bool {
        matches!(self, Self::ExchangeFailed(_) | Self::SubmissionFailed(_))
    }

    /// Human-readable, actionable message for the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDraft(detail) => {
                format!("The maintenance record cannot be added to the calendar: {detail}.")
            }
            Self::UrlRequestFailed(_) => {
                "Calendar authorization is unavailable right now. Please try again later."
                    .to_string()
            }
            Self::PopupBlocked(_) => {
                "The authorization window was blocked. Allow popups and try again.".to_string()
            }
            Self::Denied { reason } => {
                format!("Calendar access was not granted ({reason}).")
            }
            Self::ExchangeFailed(_) | Self::SubmissionFailed(_) => {
                "Adding the event failed after authorization. Please restart the calendar \
                 authorization to try again."
                    .to_string()
            }
            Self::Cancelled => "Calendar authorization was cancelled.".to_string(),
            Self::TimedOut { .. } => {
                "Calendar authorization took too long. Please start it again.".to_string()
            }
            Self::Abandoned => {
                "The authorization window was closed. Please start it again.".to_string()
            }
        }
    }
}

impl From<HandshakeError> for CarCareError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::InvalidDraft(_) => Self::InvalidInput(err.to_string()),
            HandshakeError::UrlRequestFailed(_)
            | HandshakeError::ExchangeFailed(_)
            | HandshakeError::SubmissionFailed(_) => Self::Network(err.to_string()),
            HandshakeError::PopupBlocked(_) => Self::Platform(err.to_string()),
            HandshakeError::Denied { .. } => Self::Auth(err.to_string()),
            HandshakeError::Cancelled
            | HandshakeError::TimedOut { .. }
            | HandshakeError::Abandoned => Self::Internal(err.to_string()),
        }
    }
}
