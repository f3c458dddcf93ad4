//! Calendar event payloads exchanged with the backend

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::maintenance::MaintenanceDraft;

/// Consent screen URL handed out by the backend (`{ "url": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationUrl {
    pub url: String,
}

/// Opaque credentials returned by the token exchange.
///
/// Forwarded verbatim with the event; never inspected or printed.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Value);

impl Credentials {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: String,
}

/// Event submission body:
/// `{ summary, description, start: {dateTime, timeZone}, end: {dateTime, timeZone}, credentials }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub credentials: Credentials,
}

impl CalendarEvent {
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start.date_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end.date_time
    }

    pub fn time_zone(&self) -> &str {
        &self.start.time_zone
    }
}

/// Whatever the backend answered after creating the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfirmation {
    pub event_id: Option<String>,
    pub html_link: Option<String>,
    pub body: Value,
}

impl EventConfirmation {
    /// Pick the identifier and link out of a loosely shaped response.
    ///
    /// Looks at the top level, then under `event`, then under `data`.
    pub fn from_body(body: Value) -> Self {
        let event_id = lookup(&body, "id");
        let html_link = lookup(&body, "htmlLink");
        Self { event_id, html_link, body }
    }
}

fn lookup(body: &Value, key: &str) -> Option<String> {
    [Some(body), body.get("event"), body.get("data")]
        .into_iter()
        .flatten()
        .find_map(|node| node.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Result of a successful authorization attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedEvent {
    pub draft: MaintenanceDraft,
    pub event: CalendarEvent,
    pub confirmation: EventConfirmation,
}
