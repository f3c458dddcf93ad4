//! Shared helpers for `carcare-infra` integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use carcare_core::{PopupError, PopupHandle, PopupLauncher};
use carcare_domain::BackendConfig;
use chrono::{TimeZone, Utc};
use url::Url;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const CONSENT_ORIGIN: &str = "https://accounts.example.com";
pub const API_TOKEN: &str = "test-api-token";

/// Backend config pointing at a wiremock server's `/api/v1`.
pub fn backend_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        base_url: format!("{}/api/v1", server.uri()),
        api_token: Some(API_TOKEN.to_string()),
        request_timeout_seconds: 5,
    }
}

pub fn scheduled_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
}

/// Answers the authorization URL request the way the backend does: a
/// consent screen URL that carries the caller's `state`.
pub struct ConsentUrlResponder;

impl Respond for ConsentUrlResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let state = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": format!("{CONSENT_ORIGIN}/o/oauth2/v2/auth?client_id=test&state={state}")
        }))
    }
}

/// Popup that plays the consent screen: once opened it "redirects" the
/// browser to `redirect_uri` with `query` and the consent URL's `state`.
pub struct RedirectingLauncher {
    redirect_uri: String,
    query: String,
    opened: Mutex<Vec<String>>,
    pages: Arc<Mutex<Vec<String>>>,
}

impl RedirectingLauncher {
    pub fn new(redirect_uri: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            query: query.into(),
            opened: Mutex::new(Vec::new()),
            pages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// HTML bodies the callback route answered.
    pub fn pages(&self) -> Vec<String> {
        self.pages.lock().unwrap().clone()
    }
}

impl PopupLauncher for RedirectingLauncher {
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>, PopupError> {
        self.opened.lock().unwrap().push(url.to_string());

        let consent = Url::parse(url).map_err(|err| PopupError::Blocked(err.to_string()))?;
        let state = consent
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let redirect = format!("{}?{}&state={}", self.redirect_uri, self.query, state);
        let pages = Arc::clone(&self.pages);

        tokio::spawn(async move {
            let client = reqwest::Client::builder().no_proxy().build().unwrap();
            let page = client.get(&redirect).send().await.unwrap().text().await.unwrap();
            pages.lock().unwrap().push(page);
        });

        Ok(Box::new(BrowserTab::default()))
    }
}

#[derive(Default)]
pub struct BrowserTab {
    closed: bool,
}

impl PopupHandle for BrowserTab {
    fn is_closed(&mut self) -> bool {
        self.closed
    }

    fn close(&mut self) -> Result<(), PopupError> {
        self.closed = true;
        Ok(())
    }
}
