//! HTTP adapter for the remote board API.

mod client;

pub use client::ApiClient;
