use std::time::Duration;

use carcare_domain::CarCareError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a stable identifier such as `"calendar::add_draft_to_calendar"`.
/// `error` is the failure label, `None` on success. Callers must not pass
/// anything sensitive in either.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&str>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure")
        }
    }
}

/// Convert a `CarCareError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &CarCareError) -> &'static str {
    match error {
        CarCareError::Config(_) => "config",
        CarCareError::Platform(_) => "platform",
        CarCareError::Network(_) => "network",
        CarCareError::Auth(_) => "auth",
        CarCareError::NotFound(_) => "not_found",
        CarCareError::InvalidInput(_) => "invalid_input",
        CarCareError::Internal(_) => "internal",
    }
}
