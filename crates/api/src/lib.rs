//! # CarCare App
//!
//! Application layer - commands and the CLI entry point.
//!
//! This crate contains:
//! - Calendar commands (add a draft or a stored record to the calendar)
//! - Application context (dependency injection)
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
