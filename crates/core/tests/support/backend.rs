use std::sync::Mutex;

use async_trait::async_trait;
use carcare_core::CalendarBackend;
use carcare_domain::{
    AuthorizationUrl, CalendarEvent, CarCareError, Credentials, EventConfirmation, RequestId,
    Result as DomainResult,
};
use serde_json::json;

use super::CONSENT_ORIGIN;

/// In-memory `CalendarBackend`.
///
/// Exchanged credentials embed the code (`token-for-<code>`) so tests can
/// tell which relay fed which attempt.
#[derive(Default)]
pub struct MockCalendarBackend {
    fail_url: bool,
    hang_url: bool,
    fail_exchange: bool,
    fail_submit: bool,
    url_requests: Mutex<Vec<RequestId>>,
    exchanged_codes: Mutex<Vec<String>>,
    created_events: Mutex<Vec<CalendarEvent>>,
}

impl MockCalendarBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_url(mut self) -> Self {
        self.fail_url = true;
        self
    }

    /// The URL request never answers.
    pub fn hanging_url(mut self) -> Self {
        self.hang_url = true;
        self
    }

    pub fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn url_requests(&self) -> Vec<RequestId> {
        self.url_requests.lock().unwrap().clone()
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }

    pub fn created_events(&self) -> Vec<CalendarEvent> {
        self.created_events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarBackend for MockCalendarBackend {
    async fn authorization_url(&self, request_id: &RequestId) -> DomainResult<AuthorizationUrl> {
        self.url_requests.lock().unwrap().push(request_id.clone());
        if self.hang_url {
            std::future::pending::<()>().await;
        }
        if self.fail_url {
            return Err(CarCareError::Network("connection refused".into()));
        }
        Ok(AuthorizationUrl {
            url: format!("{CONSENT_ORIGIN}/o/oauth2/v2/auth?client_id=test&state={request_id}"),
        })
    }

    async fn exchange_code(&self, code: &str) -> DomainResult<Credentials> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        if self.fail_exchange {
            return Err(CarCareError::Network("simulated network error".into()));
        }
        Ok(Credentials::new(json!({
            "access_token": format!("token-for-{code}"),
            "token_type": "Bearer"
        })))
    }

    async fn create_event(&self, event: &CalendarEvent) -> DomainResult<EventConfirmation> {
        if self.fail_submit {
            return Err(CarCareError::Network("500 Internal Server Error".into()));
        }
        let mut created = self.created_events.lock().unwrap();
        created.push(event.clone());
        let id = format!("evt-{}", created.len());
        Ok(EventConfirmation::from_body(json!({
            "message": "Event created",
            "event": {"id": id, "htmlLink": format!("https://calendar.example.com/{id}")}
        })))
    }
}
