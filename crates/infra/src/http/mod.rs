//! HTTP client plumbing shared by the infrastructure adapters.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
