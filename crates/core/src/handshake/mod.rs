//! Cross-context calendar authorization handshake
//!
//! - [`channel`]: the opener's shared message stream
//! - [`registry`]: requestId → waiting attempt
//! - [`notifier`]: runs inside the popup after the redirect back
//! - [`manager`]: starts and drives attempts

mod attempt;
pub mod channel;
pub mod manager;
pub mod notifier;
pub mod observer;
pub mod ports;
pub mod registry;

pub use channel::{MessageChannel, MessageEvent, MessageTarget};
pub use manager::{HandshakeManager, HandshakeSettings};
pub use notifier::{CallbackParams, NotifyReport, PopupNotifier, SecondaryContext};
pub use observer::{HandshakeObserver, TracingObserver};
pub use ports::{PopupError, PopupHandle, PopupLauncher};
pub use registry::{DispatchOutcome, ListenerGuard, ListenerRegistry};
