//! Shared message stream of the initiating context
//!
//! Mirrors `window.postMessage`: a sender names the origin it intends to
//! reach, and the event is only delivered when that origin is exactly the
//! receiving window's own. Every listener sees every delivered event and is
//! responsible for its own filtering.

use carcare_domain::Origin;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

/// One raw event on the shared stream.
///
/// `data` is untrusted until `origin` has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub origin: Origin,
    pub data: Value,
}

/// What a secondary context sees as its opener.
pub trait MessageTarget: Send + Sync {
    /// Post `data` to the target. Returns whether the event was delivered.
    fn post_message(&self, sender_origin: &Origin, data: Value, target_origin: &str) -> bool;
}

/// The opener's single message stream.
#[derive(Debug, Clone)]
pub struct MessageChannel {
    origin: Origin,
    sender: broadcast::Sender<MessageEvent>,
}

impl MessageChannel {
    pub fn new(origin: Origin) -> Self {
        Self::with_capacity(origin, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(origin: Origin, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { origin, sender }
    }

    /// Origin of the window that owns this stream.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Deliver `data` when `target_origin` names this window's origin.
    ///
    /// A wildcard or otherwise mismatched target is dropped without error.
    pub fn post_message(&self, sender_origin: &Origin, data: Value, target_origin: &str) -> bool {
        let addressed_here =
            Origin::parse(target_origin).map(|target| target == self.origin).unwrap_or(false);
        if !addressed_here {
            debug!(
                window = %self.origin,
                target_origin,
                sender = %sender_origin,
                "dropping message addressed to another origin"
            );
            return false;
        }

        let event = MessageEvent { origin: sender_origin.clone(), data };
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(window = %self.origin, sender = %sender_origin, receivers, "message posted");
                true
            }
            Err(_) => {
                debug!(window = %self.origin, "message posted with no listeners");
                false
            }
        }
    }
}

impl MessageTarget for MessageChannel {
    fn post_message(&self, sender_origin: &Origin, data: Value, target_origin: &str) -> bool {
        Self::post_message(self, sender_origin, data, target_origin)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn origin(value: &str) -> Origin {
        Origin::parse(value).unwrap()
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let channel = MessageChannel::new(origin("http://localhost:3000"));
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();

        assert!(channel.post_message(
            &origin("http://localhost:3000"),
            json!({"hello": 1}),
            "http://localhost:3000"
        ));

        assert_eq!(first.recv().await.unwrap().data, json!({"hello": 1}));
        assert_eq!(second.recv().await.unwrap().origin, origin("http://localhost:3000"));
    }

    #[tokio::test]
    async fn wildcard_target_never_delivers() {
        let channel = MessageChannel::new(origin("http://localhost:3000"));
        let mut rx = channel.subscribe();

        assert!(!channel.post_message(&origin("http://localhost:3000"), json!({}), "*"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mismatched_target_is_dropped() {
        let channel = MessageChannel::new(origin("http://localhost:3000"));
        let mut rx = channel.subscribe();

        assert!(!channel.post_message(
            &origin("http://localhost:3000"),
            json!({}),
            "http://localhost:3001"
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn target_may_be_any_url_on_the_origin() {
        let channel = MessageChannel::new(origin("http://localhost:3000"));
        let _rx = channel.subscribe();

        assert!(channel.post_message(
            &origin("http://localhost:3000"),
            json!({}),
            "http://localhost:3000/dashboard"
        ));
    }
}
