//! Commands exposed to the CLI

mod calendar;

pub use calendar::*;
