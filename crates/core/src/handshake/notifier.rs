//! Popup notifier
//!
//! Runs once inside the secondary context after the third party redirected
//! it back to the application's callback route. It turns the redirect's
//! query parameters into an outcome, relays it to the opener addressed to
//! the application's own origin, and schedules its own termination.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use carcare_domain::constants::{
    CALLBACK_PARAM_CODE, CALLBACK_PARAM_ERROR, CALLBACK_PARAM_STATE,
    DEFAULT_NOTIFIER_CLOSE_DELAY_MS,
};
use carcare_domain::{AuthorizationOutcome, CarCareError, Origin, RequestId, Result, WireEnvelope};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::channel::MessageTarget;

/// Query parameters of the redirect back to the callback route.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl CallbackParams {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self::from_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())))
    }

    /// Parse the query of a full callback URL.
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|err| CarCareError::InvalidInput(format!("invalid callback URL: {err}")))?;
        Ok(Self::from_pairs(url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned()))))
    }

    fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                CALLBACK_PARAM_CODE => &mut params.code,
                CALLBACK_PARAM_ERROR => &mut params.error,
                CALLBACK_PARAM_STATE => &mut params.state,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.to_string());
        }
        params
    }

    /// A code wins over an error; neither means `no_outcome`.
    pub fn outcome(&self) -> AuthorizationOutcome {
        match (non_empty(&self.code), non_empty(&self.error)) {
            (Some(code), _) => AuthorizationOutcome::Granted { code: code.to_string() },
            (None, Some(error)) => AuthorizationOutcome::Denied { reason: error.to_string() },
            (None, None) => AuthorizationOutcome::no_outcome(),
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        non_empty(&self.state).map(RequestId::from)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl fmt::Debug for CallbackParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "<redacted>"))
            .field("error", &self.error)
            .field("state", &self.state)
            .finish()
    }
}

/// The secondary browsing context, as far as the notifier is concerned.
pub trait SecondaryContext: Send + Sync {
    /// Origin the context is currently on (the application's callback origin).
    fn origin(&self) -> Origin;

    /// The context that opened this one, if any.
    fn opener(&self) -> Option<Arc<dyn MessageTarget>>;

    /// Schedule self-termination. Must not fail.
    fn terminate(&self, after: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyReport {
    /// The outcome was posted to the opener.
    Relayed,
    /// Opened directly; nobody to notify.
    NoOpener,
    /// Posted, but the opener did not accept it (wrong origin, nobody listening).
    Undelivered,
}

#[derive(Debug, Clone)]
pub struct PopupNotifier {
    app_origin: Origin,
    close_delay: Duration,
}

impl PopupNotifier {
    pub fn new(app_origin: Origin) -> Self {
        Self { app_origin, close_delay: Duration::from_millis(DEFAULT_NOTIFIER_CLOSE_DELAY_MS) }
    }

    pub fn with_close_delay(mut self, close_delay: Duration) -> Self {
        self.close_delay = close_delay;
        self
    }

    pub fn app_origin(&self) -> &Origin {
        &self.app_origin
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Relay the redirect's outcome to the opener, then terminate.
    ///
    /// Never fails: a missing opener or an undeliverable post still ends
    /// with the context scheduled for termination.
    pub fn run(&self, context: &dyn SecondaryContext, params: &CallbackParams) -> NotifyReport {
        let report = self.relay(context, params);
        context.terminate(self.close_delay);
        report
    }

    fn relay(&self, context: &dyn SecondaryContext, params: &CallbackParams) -> NotifyReport {
        let Some(opener) = context.opener() else {
            debug!("callback opened without an opener; nothing to notify");
            return NotifyReport::NoOpener;
        };

        let outcome = params.outcome();
        let request_id = params.request_id();
        let envelope = WireEnvelope::new(request_id.clone(), &outcome);
        let data = match serde_json::to_value(&envelope) {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "failed to encode relay envelope");
                return NotifyReport::Undelivered;
            }
        };

        let delivered = opener.post_message(&context.origin(), data, self.app_origin.as_str());
        info!(
            request_id = request_id.as_ref().map(RequestId::as_str),
            message_type = envelope.kind.as_str(),
            delivered,
            "relayed authorization outcome to opener"
        );

        if delivered {
            NotifyReport::Relayed
        } else {
            NotifyReport::Undelivered
        }
    }
}
