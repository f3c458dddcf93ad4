//! Loopback host for the application's OAuth callback route
//!
//! The third party redirects the popup here. Each request plays the part of
//! the secondary context: it relays the outcome to the opener's message
//! channel and answers a page that closes itself.

mod context;
mod server;

pub use context::CallbackContext;
pub use server::{CallbackBinding, CallbackServer};
