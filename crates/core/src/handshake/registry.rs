//! Explicit registry of attempts waiting for a relayed outcome
//!
//! Replaces a global message listener per attempt with one map from
//! correlation token to the attempt's delivery slot.

use std::sync::Arc;

use carcare_domain::{AuthorizationOutcome, Origin, RelayedMessage, RequestId};
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;

use super::channel::MessageEvent;

type Slots = DashMap<RequestId, oneshot::Sender<AuthorizationOutcome>>;

/// What happened to one event offered to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the attempt that owns the request id.
    Delivered,
    /// Sent from an origin other than the application's own.
    ForeignOrigin,
    /// Not a wire envelope.
    Malformed,
    /// No live attempt for the request id (or no request id at all).
    Uncorrelated,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::ForeignOrigin => "foreign_origin",
            Self::Malformed => "malformed",
            Self::Uncorrelated => "uncorrelated",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    slots: Arc<Slots>,
}

/// Keeps a registration alive. Dropping it deregisters the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    request_id: RequestId,
    slots: Arc<Slots>,
}

impl ListenerGuard {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if self.slots.remove(&self.request_id).is_some() {
            debug!(request_id = %self.request_id, "listener deregistered");
        }
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        request_id: RequestId,
    ) -> (ListenerGuard, oneshot::Receiver<AuthorizationOutcome>) {
        let (sender, receiver) = oneshot::channel();
        self.slots.insert(request_id.clone(), sender);
        debug!(request_id = %request_id, "listener registered");

        (ListenerGuard { request_id, slots: Arc::clone(&self.slots) }, receiver)
    }

    pub fn is_registered(&self, request_id: &RequestId) -> bool {
        self.slots.contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Route one event to the attempt it belongs to.
    ///
    /// The origin is checked before the payload is looked at. Anything that
    /// is not delivered is ignored; other attempts' slots are never touched.
    pub fn dispatch(&self, app_origin: &Origin, event: &MessageEvent) -> DispatchOutcome {
        let outcome = self.route(app_origin, event);
        if outcome != DispatchOutcome::Delivered {
            debug!(origin = %event.origin, outcome = outcome.as_str(), "ignoring message");
        }
        outcome
    }

    fn route(&self, app_origin: &Origin, event: &MessageEvent) -> DispatchOutcome {
        if &event.origin != app_origin {
            return DispatchOutcome::ForeignOrigin;
        }

        let Ok(message) = RelayedMessage::decode(event.origin.clone(), &event.data) else {
            return DispatchOutcome::Malformed;
        };
        let Some(request_id) = message.request_id else {
            return DispatchOutcome::Uncorrelated;
        };
        let Some((_, slot)) = self.slots.remove(&request_id) else {
            return DispatchOutcome::Uncorrelated;
        };

        match slot.send(message.outcome) {
            Ok(()) => {
                debug!(request_id = %request_id, "relayed outcome delivered");
                DispatchOutcome::Delivered
            }
            // The attempt stopped listening between lookup and send.
            Err(_) => DispatchOutcome::Uncorrelated,
        }
    }
}
