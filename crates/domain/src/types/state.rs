//! Lifecycle of a single authorization attempt

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Where an attempt is in the handshake.
///
/// ```text
/// Idle → UrlRequested → PopupOpen → AwaitingOutcome
///     → Granted → Exchanging → Submitting → Done
///     → Denied → Done
/// UrlRequested → PopupBlocked → Done
/// Exchanging → ExchangeFailed → Done
/// Submitting → SubmissionFailed → Done
/// ```
///
/// Any non-terminal state may also jump straight to `Done`; that is how
/// cancellation, timeout and abandonment settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
    Idle,
    UrlRequested,
    PopupOpen,
    AwaitingOutcome,
    Granted,
    Denied,
    PopupBlocked,
    Exchanging,
    Submitting,
    ExchangeFailed,
    SubmissionFailed,
    Done,
}

impl_domain_status_conversions!(HandshakeState {
    Idle => "idle",
    UrlRequested => "url_requested",
    PopupOpen => "popup_open",
    AwaitingOutcome => "awaiting_outcome",
    Granted => "granted",
    Denied => "denied",
    PopupBlocked => "popup_blocked",
    Exchanging => "exchanging",
    Submitting => "submitting",
    ExchangeFailed => "exchange_failed",
    SubmissionFailed => "submission_failed",
    Done => "done",
});

impl HandshakeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use HandshakeState::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Done)
                | (Idle, UrlRequested)
                | (UrlRequested, PopupOpen)
                | (UrlRequested, PopupBlocked)
                | (PopupOpen, AwaitingOutcome)
                | (AwaitingOutcome, Granted)
                | (AwaitingOutcome, Denied)
                | (Granted, Exchanging)
                | (Exchanging, Submitting)
                | (Exchanging, ExchangeFailed)
                | (Submitting, SubmissionFailed)
        )
    }
}
