//! Core COM audit model
//!
//! `domain` holds the value types, `policies` the pure classification rules,
//! and `services` the logic that combines them into findings and metadata.

pub mod domain;
pub mod policies;
pub mod services;
