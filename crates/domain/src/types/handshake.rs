//! Cross-context authorization handshake types
//!
//! These are the only artifacts that cross the boundary between the
//! initiating context and the popup that hosts the third-party consent screen.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::constants::{MESSAGE_TYPE_DENIED, MESSAGE_TYPE_GRANTED, NO_OUTCOME_REASON};
use crate::errors::{CarCareError, Result};
use crate::types::maintenance::MaintenanceDraft;

/// Opaque correlation token binding a relayed message to its attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh, unique correlation token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalised web origin (`scheme://host[:port]`).
///
/// Only tuple origins are representable; opaque origins such as `null` or
/// the `*` wildcard cannot be parsed into an `Origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin(String);

impl Origin {
    /// Parse an origin from either a bare origin or any URL on that origin.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim())
            .map_err(|err| CarCareError::InvalidInput(format!("invalid origin '{input}': {err}")))?;
        Self::from_url(&url)
    }

    /// Origin of an already parsed URL.
    pub fn from_url(url: &Url) -> Result<Self> {
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(CarCareError::InvalidInput(format!("'{url}' has an opaque origin")));
        }
        Ok(Self(origin.ascii_serialization()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Origin {
    type Error = CarCareError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Origin> for String {
    fn from(value: Origin) -> Self {
        value.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One calendar-add invocation, owned by the attempt that created it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub request_id: RequestId,
    pub draft: MaintenanceDraft,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationRequest {
    pub fn new(draft: MaintenanceDraft) -> Self {
        Self { request_id: RequestId::new(), draft, created_at: Utc::now() }
    }
}

/// What the third party decided, as seen on the redirect back.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Granted { code: String },
    Denied { reason: String },
}

impl AuthorizationOutcome {
    pub fn no_outcome() -> Self {
        Self::Denied { reason: NO_OUTCOME_REASON.to_string() }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

// The code is a credential; keep it out of logs.
impl fmt::Debug for AuthorizationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted { .. } => f.debug_struct("Granted").field("code", &"<redacted>").finish(),
            Self::Denied { reason } => f.debug_struct("Denied").field("reason", reason).finish(),
        }
    }
}

/// Discriminant of the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "AUTH_GRANTED")]
    Granted,
    #[serde(rename = "AUTH_DENIED")]
    Denied,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => MESSAGE_TYPE_GRANTED,
            Self::Denied => MESSAGE_TYPE_DENIED,
        }
    }
}

/// Literal JSON posted from the popup to its opener.
///
/// `{ "type": "AUTH_GRANTED" | "AUTH_DENIED", "requestId"?, "code"?, "error"? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireEnvelope {
    pub fn new(request_id: Option<RequestId>, outcome: &AuthorizationOutcome) -> Self {
        match outcome {
            AuthorizationOutcome::Granted { code } => Self {
                kind: MessageKind::Granted,
                request_id,
                code: Some(code.clone()),
                error: None,
            },
            AuthorizationOutcome::Denied { reason } => Self {
                kind: MessageKind::Denied,
                request_id,
                code: None,
                error: Some(reason.clone()),
            },
        }
    }

    /// Validate the envelope into an outcome.
    ///
    /// A grant without a code is malformed. A denial without an error is
    /// treated as `no_outcome`.
    pub fn outcome(&self) -> Result<AuthorizationOutcome> {
        match self.kind {
            MessageKind::Granted => match self.code.as_deref() {
                Some(code) if !code.is_empty() => {
                    Ok(AuthorizationOutcome::Granted { code: code.to_string() })
                }
                _ => Err(CarCareError::InvalidInput(format!(
                    "{} message without an authorization code",
                    MESSAGE_TYPE_GRANTED
                ))),
            },
            MessageKind::Denied => Ok(match self.error.as_deref() {
                Some(reason) if !reason.is_empty() => {
                    AuthorizationOutcome::Denied { reason: reason.to_string() }
                }
                _ => AuthorizationOutcome::no_outcome(),
            }),
        }
    }
}

/// A validated envelope together with the origin it was received from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedMessage {
    pub origin: Origin,
    pub request_id: Option<RequestId>,
    pub outcome: AuthorizationOutcome,
}

impl RelayedMessage {
    /// Decode raw message data received from `origin`.
    pub fn decode(origin: Origin, data: &serde_json::Value) -> Result<Self> {
        let envelope = WireEnvelope::deserialize(data)
            .map_err(|err| CarCareError::InvalidInput(format!("malformed relay: {err}")))?;
        let outcome = envelope.outcome()?;
        Ok(Self { origin, request_id: envelope.request_id, outcome })
    }
}
