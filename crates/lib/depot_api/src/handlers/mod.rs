//! HTTP request handlers.

pub mod auth;
pub mod health;
pub mod images;
pub mod profile;
pub mod tokens;
