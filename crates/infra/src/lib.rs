//! # CarCare Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The REST backend client (calendar endpoints, car and record lookups)
//! - The loopback callback server hosting the popup notifier
//! - The process-backed popup launcher
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `carcare-core`
//! - Contains all "impure" code (HTTP, sockets, processes)

pub mod backend;
pub mod callback;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod popup;

// Re-export commonly used items
pub use backend::BackendClient;
pub use callback::{CallbackBinding, CallbackContext, CallbackServer};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use popup::ProcessPopupLauncher;
