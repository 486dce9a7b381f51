//! Object store adapter.
//!
//! A key-addressed blob store behind a trait seam so the artifact pipeline
//! is agnostic to the backend: S3-compatible storage in production,
//! an in-process map in tests.

pub mod memory;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

/// Object store failures. Messages stay backend-generic; transport details
/// are logged at the adapter, not surfaced to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store write failed: {0}")]
    Write(String),

    #[error("object store read failed: {0}")]
    Read(String),

    #[error("object store remove failed: {0}")]
    Remove(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("bucket setup failed: {0}")]
    Bucket(String),

    #[error("staging io: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-addressed binary blob storage in a single logical bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the staged file under `key`. Existing keys are never reused
    /// by the pipeline, so overwrites do not occur in practice.
    async fn put(&self, key: &str, staging: &Path) -> Result<(), StoreError>;

    /// Fetch the full object body.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Remove the object. Removing an absent key is a no-op, which keeps
    /// concurrent deleters from failing on the object step.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
