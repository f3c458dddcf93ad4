//! Calendar commands

use std::time::Instant;

use carcare_domain::{CarCareError, HandshakeError, MaintenanceDraft, SubmittedEvent};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::utils::logging::{error_label, log_command_execution};
use crate::AppContext;

/// Failure of a calendar command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalendarCommandError {
    /// The maintenance record could not be loaded.
    #[error(transparent)]
    Lookup(#[from] CarCareError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

impl CalendarCommandError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lookup(err) => error_label(err),
            Self::Handshake(err) => err.label(),
        }
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Lookup(CarCareError::NotFound(_)) => {
                "That maintenance record no longer exists.".to_string()
            }
            Self::Lookup(err) => format!("Could not load the maintenance record: {err}"),
            Self::Handshake(err) => err.user_message(),
        }
    }
}

/// Authorize calendar access and add `draft` as an event.
pub async fn add_draft_to_calendar(
    ctx: &AppContext,
    draft: MaintenanceDraft,
    cancel: CancellationToken,
) -> Result<SubmittedEvent, CalendarCommandError> {
    let command_name = "calendar::add_draft_to_calendar";
    let start = Instant::now();

    info!(
        command = command_name,
        maintenance_type = %draft.maintenance_type,
        "adding draft to calendar"
    );
    let result = ctx.handshake.begin_authorization(draft, cancel).await.map_err(Into::into);

    log_outcome(command_name, start, &result);
    result
}

/// Load a stored maintenance record and add it to the calendar.
pub async fn add_record_to_calendar(
    ctx: &AppContext,
    car_id: &str,
    record_id: &str,
    cancel: CancellationToken,
) -> Result<SubmittedEvent, CalendarCommandError> {
    let command_name = "calendar::add_record_to_calendar";
    let start = Instant::now();

    info!(command = command_name, car_id, record_id, "adding maintenance record to calendar");
    let result = async {
        let record = ctx.records.maintenance_record(car_id, record_id).await?;
        let draft = MaintenanceDraft::try_from(&record)?;
        Ok::<_, CalendarCommandError>(ctx.handshake.begin_authorization(draft, cancel).await?)
    }
    .await;

    log_outcome(command_name, start, &result);
    result
}

fn log_outcome(
    command: &str,
    start: Instant,
    result: &Result<SubmittedEvent, CalendarCommandError>,
) {
    let error = result.as_ref().err().map(CalendarCommandError::label);
    log_command_execution(command, start.elapsed(), error);
}
