//! # CarCare Domain
//!
//! Data types shared by every CarCare crate.
//!
//! This crate contains:
//! - Handshake types (RequestId, Origin, WireEnvelope, HandshakeState)
//! - Maintenance drafts and the backend's car / record DTOs
//! - Calendar event payloads
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other CarCare crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
