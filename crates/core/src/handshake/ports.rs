//! Port interfaces for the secondary browsing context

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PopupError {
    #[error("popup could not be opened: {0}")]
    Blocked(String),

    #[error("popup could not be closed: {0}")]
    Close(String),
}

/// Opens the consent screen in a secondary context.
pub trait PopupLauncher: Send + Sync {
    /// Open `url`. Fails with [`PopupError::Blocked`] when the host refuses.
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>, PopupError>;
}

/// Exclusive ownership of one opened popup.
pub trait PopupHandle: Send {
    /// Whether the popup has gone away (closed by the user or by us).
    fn is_closed(&mut self) -> bool;

    /// Close the popup. Closing an already closed popup is a no-op.
    fn close(&mut self) -> Result<(), PopupError>;
}
