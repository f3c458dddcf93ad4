//! Domain types and models

pub mod calendar;
pub mod handshake;
pub mod maintenance;
pub mod state;

pub use calendar::{
    AuthorizationUrl, CalendarEvent, Credentials, EventConfirmation, EventDateTime, SubmittedEvent,
};
pub use handshake::{
    AuthorizationOutcome, AuthorizationRequest, MessageKind, Origin, RelayedMessage, RequestId,
    WireEnvelope,
};
pub use maintenance::{Car, MaintenanceDraft, MaintenanceRecord};
pub use state::HandshakeState;
