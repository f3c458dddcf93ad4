//! Calendar backend port interfaces

use async_trait::async_trait;
use carcare_domain::{
    AuthorizationUrl, CalendarEvent, Credentials, EventConfirmation, RequestId, Result,
};

/// Backend endpoints used by the calendar handshake.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Consent screen URL; `request_id` travels as the OAuth `state`.
    async fn authorization_url(&self, request_id: &RequestId) -> Result<AuthorizationUrl>;

    /// Exchange a single-use authorization code for credentials.
    async fn exchange_code(&self, code: &str) -> Result<Credentials>;

    /// Create the event on the user's calendar.
    async fn create_event(&self, event: &CalendarEvent) -> Result<EventConfirmation>;
}
