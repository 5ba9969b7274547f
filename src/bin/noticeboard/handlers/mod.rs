#![deny(clippy::all, clippy::pedantic)]

pub mod admin;
pub mod auth;
pub mod browse;
pub mod charts;
pub mod posts;
