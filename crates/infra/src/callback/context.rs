use std::sync::Arc;
use std::time::Duration;

use carcare_core::{MessageChannel, MessageTarget, SecondaryContext};
use carcare_domain::Origin;
use parking_lot::Mutex;

/// One redirect request, seen as a secondary context on the application's
/// origin.
///
/// The opener is the application's message channel while anything is
/// listening on it; with no listener the page behaves as if it had been
/// opened directly.
pub struct CallbackContext {
    channel: MessageChannel,
    terminate_after: Mutex<Option<Duration>>,
}

impl CallbackContext {
    pub fn new(channel: MessageChannel) -> Self {
        Self { channel, terminate_after: Mutex::new(None) }
    }

    /// Delay requested through [`SecondaryContext::terminate`], if any.
    pub fn terminate_after(&self) -> Option<Duration> {
        *self.terminate_after.lock()
    }
}

impl SecondaryContext for CallbackContext {
    fn origin(&self) -> Origin {
        self.channel.origin().clone()
    }

    fn opener(&self) -> Option<Arc<dyn MessageTarget>> {
        if self.channel.subscriber_count() == 0 {
            return None;
        }
        Some(Arc::new(self.channel.clone()))
    }

    fn terminate(&self, after: Duration) {
        *self.terminate_after.lock() = Some(after);
    }
}
