//! Shared test helpers for `carcare-core` integration tests.
//!
//! In-memory stand-ins for the ports so the handshake tests can focus on
//! protocol behaviour instead of HTTP and process plumbing.

#![allow(dead_code)]

pub mod backend;
pub mod popup;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use carcare_core::HandshakeObserver;
use carcare_domain::{HandshakeState, MaintenanceDraft, Origin, RequestId};
use chrono::{TimeZone, Utc};

pub const APP_ORIGIN: &str = "http://localhost:3000";
pub const CONSENT_ORIGIN: &str = "https://accounts.example.com";

pub fn app_origin() -> Origin {
    Origin::parse(APP_ORIGIN).unwrap()
}

pub fn consent_origin() -> Origin {
    Origin::parse(CONSENT_ORIGIN).unwrap()
}

/// `{type: "Oil Change", scheduledAt: 2024-03-15T10:00:00Z, notes: null}`
pub fn oil_change() -> MaintenanceDraft {
    MaintenanceDraft::new("Oil Change", Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Records every transition it is told about.
#[derive(Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<(RequestId, HandshakeState, HandshakeState)>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Target states in the order they were entered.
    pub fn path(&self) -> Vec<HandshakeState> {
        self.transitions.lock().unwrap().iter().map(|(_, _, to)| *to).collect()
    }

    pub fn path_of(&self, request_id: &RequestId) -> Vec<HandshakeState> {
        self.transitions
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| id == request_id)
            .map(|(_, _, to)| *to)
            .collect()
    }

    pub fn done_count(&self) -> usize {
        self.path().into_iter().filter(|state| *state == HandshakeState::Done).count()
    }
}

impl HandshakeObserver for RecordingObserver {
    fn on_transition(&self, request_id: &RequestId, from: HandshakeState, to: HandshakeState) {
        self.transitions.lock().unwrap().push((request_id.clone(), from, to));
    }
}
