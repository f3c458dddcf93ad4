//! Observation of attempt state transitions

use carcare_domain::{HandshakeState, RequestId};
use tracing::{debug, info};

/// Receives every state transition of every attempt.
pub trait HandshakeObserver: Send + Sync {
    fn on_transition(&self, request_id: &RequestId, from: HandshakeState, to: HandshakeState);
}

/// Default observer: structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HandshakeObserver for TracingObserver {
    fn on_transition(&self, request_id: &RequestId, from: HandshakeState, to: HandshakeState) {
        if to.is_terminal() {
            info!(request_id = %request_id, from = %from, "authorization attempt settled");
        } else {
            debug!(request_id = %request_id, from = %from, to = %to, "authorization state changed");
        }
    }
}
