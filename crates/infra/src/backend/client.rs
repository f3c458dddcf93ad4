//! Client for the CarCare REST backend
//!
//! Covers the three calendar endpoints the handshake needs plus the read-only
//! car and maintenance lookups used to build drafts from stored records.

use std::time::Duration;

use async_trait::async_trait;
use carcare_core::{CalendarBackend, MaintenanceRecordSource};
use carcare_domain::{
    AuthorizationUrl, BackendConfig, CalendarEvent, Car, CarCareError, Credentials,
    EventConfirmation, MaintenanceRecord, RequestId, Result,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::HttpClient;

#[derive(Deserialize)]
struct CarEnvelope {
    car: Car,
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    #[serde(default)]
    records: Vec<MaintenanceRecord>,
}

/// `CalendarBackend` and `MaintenanceRecordSource` over HTTP.
#[derive(Clone)]
pub struct BackendClient {
    http: HttpClient,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base = url::Url::parse(&config.base_url).map_err(|err| {
            CarCareError::Config(format!("invalid backend base_url {:?}: {err}", config.base_url))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token.as_deref().filter(|token| !token.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| CarCareError::Config("api token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url: base.as_str().trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl CalendarBackend for BackendClient {
    #[instrument(skip(self), fields(%request_id))]
    async fn authorization_url(&self, request_id: &RequestId) -> Result<AuthorizationUrl> {
        let url = format!(
            "{}?state={}",
            self.endpoint("google-calendar/auth"),
            urlencoding::encode(request_id.as_str())
        );
        let auth: AuthorizationUrl = self.http.get_json(&url).await?;
        if auth.url.trim().is_empty() {
            return Err(CarCareError::InvalidInput("backend returned an empty consent URL".into()));
        }
        debug!("received consent URL");
        Ok(auth)
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials> {
        let url = format!(
            "{}?code={}",
            self.endpoint("google-calendar/auth/callback"),
            urlencoding::encode(code)
        );
        let body: Value = self.http.get_json(&url).await?;
        let credentials = Credentials::new(body);
        if credentials.is_empty() {
            return Err(CarCareError::Auth("token exchange returned no credentials".into()));
        }
        Ok(credentials)
    }

    #[instrument(skip_all, fields(summary = %event.summary))]
    async fn create_event(&self, event: &CalendarEvent) -> Result<EventConfirmation> {
        let body: Value =
            self.http.post_json(&self.endpoint("google-calendar/add-event"), event).await?;
        Ok(EventConfirmation::from_body(body))
    }
}

#[async_trait]
impl MaintenanceRecordSource for BackendClient {
    async fn car(&self, car_id: &str) -> Result<Car> {
        let url = self.endpoint(&format!("car/getOneCar/{}", urlencoding::encode(car_id)));
        let envelope: CarEnvelope = self.http.get_json(&url).await?;
        Ok(envelope.car)
    }

    async fn maintenance_records(&self, car_id: &str) -> Result<Vec<MaintenanceRecord>> {
        let url = self.endpoint(&format!(
            "maintenance/getMaintenanceRecords/{}",
            urlencoding::encode(car_id)
        ));
        let envelope: RecordsEnvelope = self.http.get_json(&url).await?;
        Ok(envelope.records)
    }
}
