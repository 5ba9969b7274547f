//! Headless client for a remote notice board.
//!
//! The library holds the board logic (cursor pagination, validation, bulk
//! import, caching) behind async traits; `infra` provides the HTTP and
//! filesystem adapters and the `noticeboard` binary wires them to a CLI.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
