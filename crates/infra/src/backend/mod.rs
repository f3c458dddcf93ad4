//! REST backend adapter

mod client;

pub use client::BackendClient;
