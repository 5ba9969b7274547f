//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod http;
pub mod session_store;
pub mod telemetry;
