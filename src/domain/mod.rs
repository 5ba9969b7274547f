//! Client-side domain rules: content validation and derived post statistics.

pub mod error;
pub mod stats;
pub mod validation;
