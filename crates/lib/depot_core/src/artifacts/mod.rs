//! Artifact pipeline: ingestion and removal coordinated across the object
//! store and the metadata table.
//!
//! This module exclusively owns the create/delete lifecycle of artifact
//! rows. The ordering rules keep the two stores consistent under partial
//! failure: write object before row on ingest, remove object before row on
//! delete. A failed ingest may strand an object with no row (logged,
//! acceptable); a row referencing a missing object must never exist.

pub mod pipeline;
pub mod queries;

use thiserror::Error;

use crate::store::StoreError;

/// Artifact pipeline errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Image not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
