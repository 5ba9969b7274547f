//! Application services layer.

pub mod admin;
pub mod auth;
pub mod board;
pub mod charts;
pub mod error;
pub mod import;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod session;
