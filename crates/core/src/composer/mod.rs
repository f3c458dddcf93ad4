//! Exchange & composer
//!
//! Turns a granted authorization code into a submitted calendar event:
//! exchange the code, compose the event from the draft, submit it. The code
//! is single-use, so nothing here is retried.

use std::sync::Arc;

use carcare_domain::constants::{DEFAULT_EVENT_DESCRIPTION, EVENT_SUMMARY_PREFIX};
use carcare_domain::{
    CalendarEvent, Credentials, EventConfirmation, EventDateTime, HandshakeError,
    MaintenanceDraft, SubmittedEvent,
};
use tracing::{info, instrument, warn};

use crate::calendar_ports::CalendarBackend;

/// Build the calendar event for `draft`.
///
/// The event lasts one hour unless the draft carries a duration hint. Fails
/// with `InvalidDraft` when the end falls outside the representable range.
pub fn compose_event(
    draft: &MaintenanceDraft,
    credentials: Credentials,
    time_zone: &str,
) -> Result<CalendarEvent, HandshakeError> {
    draft.validate()?;
    let start = draft.scheduled_at;
    let end = draft.end_time().ok_or_else(|| {
        HandshakeError::InvalidDraft("event end is out of range".to_string())
    })?;
    let description = draft
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .unwrap_or(DEFAULT_EVENT_DESCRIPTION);

    Ok(CalendarEvent {
        summary: format!("{EVENT_SUMMARY_PREFIX}{}", draft.maintenance_type.trim()),
        description: description.to_string(),
        start: EventDateTime { date_time: start, time_zone: time_zone.to_string() },
        end: EventDateTime { date_time: end, time_zone: time_zone.to_string() },
        credentials,
    })
}

#[derive(Clone)]
pub struct ExchangeComposer {
    backend: Arc<dyn CalendarBackend>,
    time_zone: String,
}

impl ExchangeComposer {
    pub fn new(backend: Arc<dyn CalendarBackend>, time_zone: impl Into<String>) -> Self {
        Self { backend, time_zone: time_zone.into() }
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub async fn exchange(&self, code: &str) -> Result<Credentials, HandshakeError> {
        self.backend.exchange_code(code).await.map_err(|err| {
            warn!(error = %err, "authorization code exchange failed");
            HandshakeError::ExchangeFailed(err.to_string())
        })
    }

    pub fn compose(
        &self,
        draft: &MaintenanceDraft,
        credentials: Credentials,
    ) -> Result<CalendarEvent, HandshakeError> {
        compose_event(draft, credentials, &self.time_zone)
    }

    pub async fn submit(&self, event: &CalendarEvent) -> Result<EventConfirmation, HandshakeError> {
        let confirmation = self.backend.create_event(event).await.map_err(|err| {
            warn!(error = %err, "calendar event submission failed");
            HandshakeError::SubmissionFailed(err.to_string())
        })?;
        info!(
            event_id = confirmation.event_id.as_deref(),
            summary = %event.summary,
            "calendar event created"
        );
        Ok(confirmation)
    }

    /// Exchange `code`, compose the event and submit it.
    ///
    /// The draft is checked first so an unusable draft never spends the code.
    #[instrument(skip_all, fields(maintenance_type = %draft.maintenance_type))]
    pub async fn exchange_and_submit(
        &self,
        code: &str,
        draft: &MaintenanceDraft,
    ) -> Result<SubmittedEvent, HandshakeError> {
        draft.validate()?;
        let credentials = self.exchange(code).await?;
        let event = self.compose(draft, credentials)?;
        let confirmation = self.submit(&event).await?;
        Ok(SubmittedEvent { draft: draft.clone(), event, confirmation })
    }
}
