//! Shared helpers for `carcare-app` integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use carcare_core::{PopupError, PopupHandle, PopupLauncher};
use carcare_domain::{BackendConfig, CallbackConfig, Config};
use carcare_lib::AppContext;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Config pointing at `backend`, with a loopback callback on an ephemeral port.
pub fn test_config(backend: &MockServer) -> Config {
    Config {
        backend: BackendConfig {
            base_url: format!("{}/api/v1", backend.uri()),
            api_token: Some("test-token".into()),
            request_timeout_seconds: 5,
        },
        callback: CallbackConfig { bind_addr: "127.0.0.1:0".into(), ..Default::default() },
        ..Config::default()
    }
}

pub async fn context(backend: &MockServer) -> (AppContext, Arc<ConsentLauncher>) {
    let launcher = Arc::new(ConsentLauncher::default());
    let ctx = AppContext::new_with_launcher(test_config(backend), launcher.clone())
        .await
        .expect("context should start");
    (ctx, launcher)
}

struct ConsentUrl;

impl Respond for ConsentUrl {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let state = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("https://accounts.example.com/o/oauth2/v2/auth?state={state}")
        }))
    }
}

/// Mount the three calendar endpoints.
pub async fn mount_calendar(backend: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/google-calendar/auth"))
        .respond_with(ConsentUrl)
        .mount(backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/google-calendar/auth/callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .mount(backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/google-calendar/add-event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event": {"id": "evt-1", "htmlLink": "https://calendar.google.com/evt-1"}
        })))
        .mount(backend)
        .await;
}

/// Popup launcher that leaves the consent decision to the test.
#[derive(Default)]
pub struct ConsentLauncher {
    opened: Mutex<Vec<String>>,
}

impl ConsentLauncher {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Wait for the consent screen, then return its `state`.
    pub async fn wait_for_consent(&self) -> String {
        for _ in 0..200 {
            if let Some(url) = self.opened().pop() {
                let url = Url::parse(&url).unwrap();
                return url
                    .query_pairs()
                    .find(|(key, _)| key == "state")
                    .map(|(_, value)| value.into_owned())
                    .unwrap();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("consent screen never opened");
    }
}

impl PopupLauncher for ConsentLauncher {
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>, PopupError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(Box::new(Tab { closed: false }))
    }
}

struct Tab {
    closed: bool,
}

impl PopupHandle for Tab {
    fn is_closed(&mut self) -> bool {
        self.closed
    }

    fn close(&mut self) -> Result<(), PopupError> {
        self.closed = true;
        Ok(())
    }
}

/// Follow the provider's redirect back to the app, as the browser would.
pub async fn redirect(ctx: &AppContext, query: &str) -> String {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    client
        .get(format!("{}?{query}", ctx.redirect_uri()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}
