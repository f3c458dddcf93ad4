//! Application constants
//!
//! Centralized location for domain-level constants shared by the handshake
//! and the event composer.

// Cross-context wire protocol
pub const MESSAGE_TYPE_GRANTED: &str = "AUTH_GRANTED";
pub const MESSAGE_TYPE_DENIED: &str = "AUTH_DENIED";
pub const NO_OUTCOME_REASON: &str = "no_outcome";

// Callback redirect query parameters
pub const CALLBACK_PARAM_CODE: &str = "code";
pub const CALLBACK_PARAM_ERROR: &str = "error";
pub const CALLBACK_PARAM_STATE: &str = "state";
pub const DEFAULT_CALLBACK_PATH: &str = "/api/v1/calendar/auth/callback";

// Calendar event composition
pub const EVENT_SUMMARY_PREFIX: &str = "Car Maintenance: ";
pub const DEFAULT_EVENT_DESCRIPTION: &str = "Scheduled Maintenance";
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

// Handshake timing defaults
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POPUP_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_NOTIFIER_CLOSE_DELAY_MS: u64 = 1000;
