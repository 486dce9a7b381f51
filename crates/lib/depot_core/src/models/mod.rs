//! Domain models shared across depot crates.

pub mod artifact;
pub mod auth;
