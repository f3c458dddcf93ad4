//! Thin reqwest wrapper shared by the backend adapters; sends every request once

use std::time::Duration;

use carcare_domain::CarCareError;
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with timeout and status mapping.
///
/// Requests are sent exactly once. The calendar backend consumes the
/// authorization code on the first exchange call, so a blind resend can only
/// fail with a confusing second error.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, CarCareError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request and turn non-success statuses into domain errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CarCareError> {
        let request = builder.build().map_err(|err| CarCareError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = redact_query(request.url());
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            CarCareError::from(InfraError::from(err))
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.ok();
        Err(InfraError::from_status(status, detail.as_deref().map(error_detail).as_deref()).into())
    }

    /// Send and decode a JSON body.
    pub async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T, CarCareError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|err| CarCareError::from(InfraError::from(err)))
    }

    pub async fn get_json<T>(&self, url: &str) -> Result<T, CarCareError>
    where
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::GET, url)).await
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, CarCareError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::POST, url).json(body)).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: Some(concat!("carcare/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, CarCareError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| CarCareError::from(InfraError::from(err)))?;
        Ok(HttpClient { client })
    }
}

// The exchange call carries the authorization code in its query.
fn redact_query(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("redacted"));
    }
    url.to_string()
}

/// Pull `message`/`error` out of a JSON error body, otherwise keep it short.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.chars().take(200).collect()
}
