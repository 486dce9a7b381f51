//! # depot_core
//!
//! Core domain logic for Depot: credential store, artifact pipeline,
//! object store adapter, and automation token lifecycle.

pub mod artifacts;
pub mod auth;
pub mod db;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
