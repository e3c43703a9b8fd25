//! HTTP client used for outbound service calls.

mod client;

pub use client::{DEFAULT_TIMEOUT, HttpClient, HttpClientBuilder, HttpClientConfig};
