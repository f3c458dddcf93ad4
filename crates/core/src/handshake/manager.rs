//! Session initiator
//!
//! Drives one authorization attempt per call: request a consent URL, open
//! it in a popup, wait for the correlated relay, then exchange and submit.
//! All attempts share one registry fed by a single pump from the opener's
//! message stream.

use std::sync::Arc;
use std::time::Duration;

use carcare_domain::constants::{DEFAULT_HANDSHAKE_TIMEOUT_SECS, DEFAULT_POPUP_POLL_INTERVAL_MS};
use carcare_domain::{
    AuthorizationOutcome, AuthorizationRequest, CarCareError, HandshakeError, HandshakeState,
    MaintenanceDraft, Origin, SubmittedEvent,
};
use chrono_tz::Tz;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::attempt::Attempt;
use super::channel::{MessageChannel, MessageEvent};
use super::observer::{HandshakeObserver, TracingObserver};
use super::ports::PopupLauncher;
use super::registry::{DispatchOutcome, ListenerRegistry};
use crate::calendar_ports::CalendarBackend;
use crate::composer::ExchangeComposer;

/// Consecutive closed polls before a popup counts as abandoned.
const CLOSED_POLLS_BEFORE_ABANDON: u32 = 2;

/// Timing and identity of every attempt a manager runs.
///
/// Both durations are non-zero; the builders reject anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeSettings {
    app_origin: Origin,
    time_zone: String,
    timeout: Duration,
    popup_poll_interval: Duration,
}

impl HandshakeSettings {
    /// Fails with `Config` when `time_zone` is not an IANA zone name.
    pub fn new(app_origin: Origin, time_zone: &str) -> Result<Self, CarCareError> {
        let zone: Tz = time_zone
            .trim()
            .parse()
            .map_err(|_| CarCareError::Config(format!("unknown time zone '{time_zone}'")))?;

        Ok(Self {
            app_origin,
            time_zone: zone.name().to_string(),
            timeout: Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS),
            popup_poll_interval: Duration::from_millis(DEFAULT_POPUP_POLL_INTERVAL_MS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, CarCareError> {
        self.timeout = non_zero("handshake timeout", timeout)?;
        Ok(self)
    }

    pub fn with_popup_poll_interval(mut self, interval: Duration) -> Result<Self, CarCareError> {
        self.popup_poll_interval = non_zero("popup poll interval", interval)?;
        Ok(self)
    }

    /// The application's own origin; the only origin relays are accepted from.
    pub fn app_origin(&self) -> &Origin {
        &self.app_origin
    }

    /// IANA zone written into composed events.
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn popup_poll_interval(&self) -> Duration {
        self.popup_poll_interval
    }
}

fn non_zero(what: &str, value: Duration) -> Result<Duration, CarCareError> {
    if value.is_zero() {
        return Err(CarCareError::Config(format!("{what} must be greater than zero")));
    }
    Ok(value)
}

pub struct HandshakeManager {
    backend: Arc<dyn CalendarBackend>,
    launcher: Arc<dyn PopupLauncher>,
    observer: Arc<dyn HandshakeObserver>,
    composer: ExchangeComposer,
    registry: ListenerRegistry,
    settings: HandshakeSettings,
}

impl HandshakeManager {
    pub fn new(
        backend: Arc<dyn CalendarBackend>,
        launcher: Arc<dyn PopupLauncher>,
        settings: HandshakeSettings,
    ) -> Self {
        let composer = ExchangeComposer::new(Arc::clone(&backend), settings.time_zone.clone());
        Self {
            backend,
            launcher,
            observer: Arc::new(TracingObserver),
            composer,
            registry: ListenerRegistry::new(),
            settings,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HandshakeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &HandshakeSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Feed the opener's message stream into the registry.
    ///
    /// The subscription is taken before this returns, so anything posted
    /// afterwards is seen. The task ends when the channel is dropped.
    pub fn attach(&self, channel: &MessageChannel) -> JoinHandle<()> {
        let mut events = channel.subscribe();
        let registry = self.registry.clone();
        let app_origin = self.settings.app_origin.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        registry.dispatch(&app_origin, &event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "message pump lagged; events were dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Offer one event directly, for hosts that deliver events themselves.
    pub fn dispatch(&self, event: &MessageEvent) -> DispatchOutcome {
        self.registry.dispatch(&self.settings.app_origin, event)
    }

    /// Run one authorization attempt for `draft` to completion.
    ///
    /// Every path, including cancellation and dropping the returned future,
    /// closes the popup and deregisters the listener.
    #[instrument(skip_all, fields(request_id = tracing::field::Empty))]
    pub async fn begin_authorization(
        &self,
        draft: MaintenanceDraft,
        cancel: CancellationToken,
    ) -> Result<SubmittedEvent, HandshakeError> {
        let request = AuthorizationRequest::new(draft);
        tracing::Span::current().record("request_id", request.request_id.as_str());

        let mut attempt = Attempt::new(request.request_id.clone(), Arc::clone(&self.observer));
        let result = self.drive(&mut attempt, &request, &cancel).await;
        attempt.finish();

        match &result {
            Ok(submitted) => info!(
                event_id = submitted.confirmation.event_id.as_deref(),
                "calendar authorization completed"
            ),
            Err(err) => warn!(error = %err, label = err.label(), "calendar authorization failed"),
        }
        result
    }

    async fn drive(
        &self,
        attempt: &mut Attempt,
        request: &AuthorizationRequest,
        cancel: &CancellationToken,
    ) -> Result<SubmittedEvent, HandshakeError> {
        request.draft.validate()?;
        if cancel.is_cancelled() {
            return Err(HandshakeError::Cancelled);
        }

        // Listen before the popup exists so a fast relay is not missed.
        let (guard, relay) = self.registry.register(request.request_id.clone());
        attempt.hold_listener(guard);

        attempt.transition(HandshakeState::UrlRequested);
        let consent = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HandshakeError::Cancelled),
            result = self.backend.authorization_url(&request.request_id) => {
                result.map_err(|err| HandshakeError::UrlRequestFailed(err.to_string()))?
            }
        };

        let popup = match self.launcher.open(&consent.url) {
            Ok(popup) => popup,
            Err(err) => {
                attempt.transition(HandshakeState::PopupBlocked);
                return Err(HandshakeError::PopupBlocked(err.to_string()));
            }
        };
        attempt.hold_popup(popup);
        attempt.transition(HandshakeState::PopupOpen);
        attempt.transition(HandshakeState::AwaitingOutcome);

        let outcome = self.await_outcome(attempt, relay, cancel).await?;
        attempt.release();

        match outcome {
            AuthorizationOutcome::Denied { reason } => {
                attempt.transition(HandshakeState::Denied);
                Err(HandshakeError::Denied { reason })
            }
            AuthorizationOutcome::Granted { code } => {
                attempt.transition(HandshakeState::Granted);
                self.exchange_and_submit(attempt, &code, &request.draft, cancel).await
            }
        }
    }

    async fn await_outcome(
        &self,
        attempt: &mut Attempt,
        mut relay: oneshot::Receiver<AuthorizationOutcome>,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationOutcome, HandshakeError> {
        let deadline = tokio::time::sleep(self.settings.timeout);
        tokio::pin!(deadline);

        let mut poll = tokio::time::interval(self.settings.popup_poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await;

        let mut closed_polls = 0;
        loop {
            tokio::select! {
                biased;
                received = &mut relay => {
                    // The sender only disappears with our own guard.
                    return received.map_err(|_| HandshakeError::Cancelled);
                }
                () = cancel.cancelled() => return Err(HandshakeError::Cancelled),
                () = &mut deadline => {
                    return Err(HandshakeError::TimedOut { seconds: self.settings.timeout.as_secs() });
                }
                _ = poll.tick() => {
                    if attempt.popup_closed() {
                        closed_polls += 1;
                        if closed_polls >= CLOSED_POLLS_BEFORE_ABANDON {
                            return Err(HandshakeError::Abandoned);
                        }
                    } else {
                        closed_polls = 0;
                    }
                }
            }
        }
    }

    async fn exchange_and_submit(
        &self,
        attempt: &mut Attempt,
        code: &str,
        draft: &MaintenanceDraft,
        cancel: &CancellationToken,
    ) -> Result<SubmittedEvent, HandshakeError> {
        attempt.transition(HandshakeState::Exchanging);
        let exchanged = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HandshakeError::Cancelled),
            exchanged = self.composer.exchange(code) => exchanged,
        };
        let credentials = exchanged.inspect_err(|_| {
            attempt.transition(HandshakeState::ExchangeFailed);
        })?;

        let event = self.composer.compose(draft, credentials)?;

        attempt.transition(HandshakeState::Submitting);
        let submitted = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HandshakeError::Cancelled),
            submitted = self.composer.submit(&event) => submitted,
        };
        let confirmation = submitted.inspect_err(|_| {
            attempt.transition(HandshakeState::SubmissionFailed);
        })?;

        Ok(SubmittedEvent { draft: draft.clone(), event, confirmation })
    }
}
