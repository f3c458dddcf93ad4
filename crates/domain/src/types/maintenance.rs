//! Maintenance drafts and the backend's car / record DTOs

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::constants::DEFAULT_EVENT_DURATION_MINUTES;
use serde::{Deserialize, Serialize};

use crate::errors::HandshakeError;

/// The part of a maintenance record needed to put it on a calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDraft {
    pub maintenance_type: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration_hint_minutes: Option<i64>,
}

impl MaintenanceDraft {
    pub fn new(maintenance_type: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            maintenance_type: maintenance_type.into(),
            scheduled_at,
            notes: None,
            duration_hint_minutes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_hint_minutes = Some(minutes);
        self
    }

    /// `None` when there is no hint or it does not fit a `Duration`.
    pub fn duration_hint(&self) -> Option<Duration> {
        self.duration_hint_minutes.and_then(Duration::try_minutes)
    }

    /// End of the event: one hour after the start unless a hint says
    /// otherwise. `None` when the hint or the end overflows.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let length = match self.duration_hint_minutes {
            Some(minutes) => Duration::try_minutes(minutes)?,
            None => Duration::try_minutes(DEFAULT_EVENT_DURATION_MINUTES)?,
        };
        self.scheduled_at.checked_add_signed(length)
    }

    /// Reject drafts that cannot become a calendar event.
    pub fn validate(&self) -> Result<(), HandshakeError> {
        if self.maintenance_type.trim().is_empty() {
            return Err(HandshakeError::InvalidDraft("maintenance type is empty".to_string()));
        }
        if let Some(minutes) = self.duration_hint_minutes {
            if minutes <= 0 {
                return Err(HandshakeError::InvalidDraft(format!(
                    "duration must be positive, got {minutes} minutes"
                )));
            }
        }
        if self.end_time().is_none() {
            return Err(HandshakeError::InvalidDraft(format!(
                "event starting at {} cannot end within the supported date range",
                self.scheduled_at
            )));
        }
        Ok(())
    }
}

/// Car as returned by `car/getOneCar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl Car {
    pub fn display_name(&self) -> String {
        let parts: Vec<String> = [
            self.year.map(|year| year.to_string()),
            self.make.clone(),
            self.model.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();

        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Maintenance record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub car_id: Option<String>,
    pub maintenance_type: String,
    #[serde(default)]
    pub date_scheduled: Option<String>,
    #[serde(default)]
    pub date_completed: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<&MaintenanceRecord> for MaintenanceDraft {
    type Error = HandshakeError;

    fn try_from(record: &MaintenanceRecord) -> Result<Self, Self::Error> {
        let raw = record.date_scheduled.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(HandshakeError::InvalidDraft(format!(
                "record {} has no scheduled date",
                record.id
            )));
        }

        let scheduled_at = parse_scheduled_at(raw).ok_or_else(|| {
            HandshakeError::InvalidDraft(format!("unrecognised scheduled date '{raw}'"))
        })?;

        let draft = Self {
            maintenance_type: record.maintenance_type.clone(),
            scheduled_at,
            notes: record.notes.clone().filter(|notes| !notes.trim().is_empty()),
            duration_hint_minutes: None,
        };
        draft.validate()?;
        Ok(draft)
    }
}

// RFC 3339, then datetime-local form input, then a bare date at midnight UTC.
fn parse_scheduled_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
