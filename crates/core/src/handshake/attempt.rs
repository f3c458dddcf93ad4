//! Resources owned by one in-flight attempt

use std::sync::Arc;

use carcare_domain::{HandshakeState, RequestId};
use tracing::{debug, warn};

use super::observer::HandshakeObserver;
use super::ports::PopupHandle;
use super::registry::ListenerGuard;

/// State, popup and listener of one attempt.
///
/// Dropping it releases everything and settles the attempt in `Done`, so a
/// future dropped mid-flight cleans up the same way a terminal outcome does.
pub(crate) struct Attempt {
    request_id: RequestId,
    state: HandshakeState,
    observer: Arc<dyn HandshakeObserver>,
    popup: Option<Box<dyn PopupHandle>>,
    listener: Option<ListenerGuard>,
}

impl Attempt {
    pub(crate) fn new(request_id: RequestId, observer: Arc<dyn HandshakeObserver>) -> Self {
        Self { request_id, state: HandshakeState::Idle, observer, popup: None, listener: None }
    }

    pub(crate) fn transition(&mut self, next: HandshakeState) {
        if !self.state.can_transition_to(next) {
            warn!(
                request_id = %self.request_id,
                from = %self.state,
                to = %next,
                "ignoring invalid handshake transition"
            );
            return;
        }
        let from = std::mem::replace(&mut self.state, next);
        self.observer.on_transition(&self.request_id, from, next);
    }

    pub(crate) fn hold_listener(&mut self, guard: ListenerGuard) {
        self.listener = Some(guard);
    }

    pub(crate) fn hold_popup(&mut self, popup: Box<dyn PopupHandle>) {
        self.popup = Some(popup);
    }

    /// Whether the held popup reports itself closed. False once released.
    pub(crate) fn popup_closed(&mut self) -> bool {
        self.popup.as_mut().is_some_and(|popup| popup.is_closed())
    }

    /// Close the popup and deregister the listener. Safe to call repeatedly.
    pub(crate) fn release(&mut self) {
        if let Some(mut popup) = self.popup.take() {
            if !popup.is_closed() {
                if let Err(err) = popup.close() {
                    debug!(request_id = %self.request_id, error = %err, "popup close failed");
                }
            }
        }
        self.listener.take();
    }

    pub(crate) fn finish(&mut self) {
        self.release();
        if !self.state.is_terminal() {
            self.transition(HandshakeState::Done);
        }
    }
}

impl Drop for Attempt {
    fn drop(&mut self) {
        self.finish();
    }
}
