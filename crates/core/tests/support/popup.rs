use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use carcare_core::{
    CallbackParams, MessageChannel, MessageTarget, PopupError, PopupHandle, PopupLauncher,
    PopupNotifier, SecondaryContext,
};
use carcare_domain::{Origin, RequestId};
use url::Url;

use super::app_origin;

/// Shared view of one popup the launcher opened.
#[derive(Clone, Default)]
pub struct PopupProbe {
    pub url: String,
    closed: Arc<AtomicBool>,
    close_calls: Arc<AtomicUsize>,
}

impl PopupProbe {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Simulate the user closing the window.
    pub fn close_by_user(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// The `state` parameter of the consent URL, i.e. the attempt's request id.
    pub fn request_id(&self) -> RequestId {
        let url = Url::parse(&self.url).unwrap();
        let state = url.query_pairs().find(|(key, _)| key == "state").unwrap().1;
        RequestId::from(state.into_owned())
    }
}

struct MockPopupHandle {
    probe: PopupProbe,
}

impl PopupHandle for MockPopupHandle {
    fn is_closed(&mut self) -> bool {
        self.probe.is_closed()
    }

    fn close(&mut self) -> Result<(), PopupError> {
        self.probe.close_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

enum Behavior {
    Stay,
    Blocked,
    ClosedByUser,
    /// Immediately redirect back to the callback route with `query` and run
    /// the notifier against `opener`.
    Redirect { opener: MessageChannel, query: String },
}

pub struct MockPopupLauncher {
    behavior: Behavior,
    opened: Mutex<Vec<PopupProbe>>,
    attempts: AtomicUsize,
}

impl MockPopupLauncher {
    fn with(behavior: Behavior) -> Self {
        Self { behavior, opened: Mutex::new(Vec::new()), attempts: AtomicUsize::new(0) }
    }

    /// Opens and waits for a relay from elsewhere.
    pub fn staying() -> Self {
        Self::with(Behavior::Stay)
    }

    pub fn blocked() -> Self {
        Self::with(Behavior::Blocked)
    }

    pub fn closed_by_user() -> Self {
        Self::with(Behavior::ClosedByUser)
    }

    pub fn redirecting(opener: &MessageChannel, query: &str) -> Self {
        Self::with(Behavior::Redirect { opener: opener.clone(), query: query.to_string() })
    }

    pub fn opened(&self) -> Vec<PopupProbe> {
        self.opened.lock().unwrap().clone()
    }

    pub fn open_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl PopupLauncher for MockPopupLauncher {
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>, PopupError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if matches!(self.behavior, Behavior::Blocked) {
            return Err(PopupError::Blocked("popup blocked by host".into()));
        }

        let probe = PopupProbe { url: url.to_string(), ..PopupProbe::default() };
        match &self.behavior {
            Behavior::ClosedByUser => probe.close_by_user(),
            Behavior::Redirect { opener, query } => {
                let state = probe.request_id();
                let callback = format!(
                    "{}/api/v1/calendar/auth/callback?{query}&state={state}",
                    app_origin()
                );
                let context = MockSecondaryContext::opened_by(Arc::new(opener.clone()));
                PopupNotifier::new(app_origin())
                    .run(&context, &CallbackParams::from_url(&callback).unwrap());
            }
            Behavior::Stay | Behavior::Blocked => {}
        }

        self.opened.lock().unwrap().push(probe.clone());
        Ok(Box::new(MockPopupHandle { probe }))
    }
}

/// Secondary context living on the application's origin.
pub struct MockSecondaryContext {
    origin: Origin,
    opener: Option<Arc<dyn MessageTarget>>,
    terminated_after: Mutex<Option<Duration>>,
}

impl MockSecondaryContext {
    pub fn opened_by(opener: Arc<dyn MessageTarget>) -> Self {
        Self { origin: app_origin(), opener: Some(opener), terminated_after: Mutex::new(None) }
    }

    /// Opened directly, e.g. the callback URL pasted into a tab.
    pub fn orphan() -> Self {
        Self { origin: app_origin(), opener: None, terminated_after: Mutex::new(None) }
    }

    pub fn on_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn terminated_after(&self) -> Option<Duration> {
        *self.terminated_after.lock().unwrap()
    }
}

impl SecondaryContext for MockSecondaryContext {
    fn origin(&self) -> Origin {
        self.origin.clone()
    }

    fn opener(&self) -> Option<Arc<dyn MessageTarget>> {
        self.opener.clone()
    }

    fn terminate(&self, after: Duration) {
        *self.terminated_after.lock().unwrap() = Some(after);
    }
}

/// Opener that only records what was posted to it.
#[derive(Default)]
pub struct RecordingTarget {
    posts: Mutex<Vec<(Origin, serde_json::Value, String)>>,
}

impl RecordingTarget {
    /// `(sender origin, data, target origin)` of every post.
    pub fn posts(&self) -> Vec<(Origin, serde_json::Value, String)> {
        self.posts.lock().unwrap().clone()
    }
}

impl MessageTarget for RecordingTarget {
    fn post_message(
        &self,
        sender_origin: &Origin,
        data: serde_json::Value,
        target_origin: &str,
    ) -> bool {
        self.posts.lock().unwrap().push((sender_origin.clone(), data, target_origin.to_string()));
        true
    }
}
