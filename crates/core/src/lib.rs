//! # CarCare Core
//!
//! Protocol logic of the calendar authorization handshake - no
//! infrastructure dependencies.
//!
//! This crate contains:
//! - The opener's message channel and the listener registry
//! - The popup notifier that relays the redirect's outcome
//! - The handshake manager (session initiator)
//! - The exchange & composer step
//! - Port interfaces (traits) for the backend and the popup host
//!
//! ## Architecture Principles
//! - Only depends on `carcare-domain`
//! - No HTTP, process or platform code
//! - All external dependencies via traits

pub mod composer;
pub mod handshake;

// Infrastructure ports
pub mod calendar_ports;
pub mod maintenance_ports;

pub use calendar_ports::CalendarBackend;
pub use composer::{compose_event, ExchangeComposer};
pub use handshake::{
    CallbackParams, DispatchOutcome, HandshakeManager, HandshakeObserver, HandshakeSettings,
    ListenerRegistry, MessageChannel, MessageEvent, MessageTarget, NotifyReport, PopupError,
    PopupHandle, PopupLauncher, PopupNotifier, SecondaryContext, TracingObserver,
};
pub use maintenance_ports::MaintenanceRecordSource;
