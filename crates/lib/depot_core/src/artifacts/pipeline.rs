//! Artifact ingestion and removal.

use std::path::Path;

use sqlx::PgPool;
use tracing::{info, warn};

use super::{ArtifactError, queries};
use crate::models::artifact::Artifact;
use crate::models::auth::Identity;
use crate::store::BlobStore;
use crate::uuid::uuidv7;

/// Derive a fresh object key for an upload.
///
/// UUIDv7 prefixes are timestamp-derived and unique, so keys never collide
/// and are never reused; the display name suffix keeps the bucket browsable.
pub fn object_key(display_name: &str) -> String {
    format!("{}-{}", uuidv7(), display_name)
}

/// Ingest a staged upload: write the object, then register the metadata row.
///
/// Ordering is the consistency guarantee. A store failure aborts before any
/// metadata mutation. A metadata failure after a successful write strands an
/// orphaned object — logged and accepted, because a missing row is safer
/// than a row referencing a missing object. The staging file is the caller's
/// scoped resource and is released regardless of outcome.
pub async fn ingest(
    pool: &PgPool,
    store: &dyn BlobStore,
    staging: &Path,
    display_name: &str,
    identity: &Identity,
) -> Result<Artifact, ArtifactError> {
    let key = object_key(display_name);

    store.put(&key, staging).await?;

    let id = uuidv7().to_string();
    let inserted = queries::insert_artifact(
        pool,
        &id,
        display_name,
        &key,
        identity.uploader_label(),
    )
    .await;

    match inserted {
        Ok(artifact) => {
            info!(id = %artifact.id, key = %key, by = %artifact.uploaded_by, "artifact ingested");
            Ok(artifact)
        }
        Err(err) => {
            // The object was written but has no row: orphaned, not dangling.
            warn!(key = %key, error = %err, "metadata insert failed after object write; object orphaned");
            Err(err)
        }
    }
}

/// Fetch one artifact's metadata.
pub async fn get(pool: &PgPool, id: &str) -> Result<Artifact, ArtifactError> {
    queries::get_artifact(pool, id)
        .await?
        .ok_or(ArtifactError::NotFound)
}

/// List artifact metadata, newest first.
pub async fn list(pool: &PgPool) -> Result<Vec<Artifact>, ArtifactError> {
    queries::list_artifacts(pool).await
}

/// Delete one artifact: object first, row second.
///
/// Object removal success is the precondition for row removal — a failed
/// removal keeps the row so no object is ever stranded without a record.
/// The final compare-and-delete serializes concurrent deleters: the loser
/// observes `NotFound` rather than double-freeing anything.
pub async fn delete(pool: &PgPool, store: &dyn BlobStore, id: &str) -> Result<(), ArtifactError> {
    let artifact = get(pool, id).await?;

    store.remove(&artifact.object_key).await?;

    if !queries::delete_artifact_row(pool, &artifact.id).await? {
        return Err(ArtifactError::NotFound);
    }
    info!(id = %artifact.id, key = %artifact.object_key, "artifact deleted");
    Ok(())
}

/// Delete every artifact, applying the per-item object-then-row ordering.
///
/// Policy: abort the remaining batch on the first object-removal failure and
/// surface it. Items already processed stay deleted; each was individually
/// consistent when processed.
pub async fn delete_all(pool: &PgPool, store: &dyn BlobStore) -> Result<u64, ArtifactError> {
    let artifacts = queries::list_artifacts(pool).await?;
    let mut deleted = 0u64;

    for artifact in artifacts {
        store.remove(&artifact.object_key).await?;
        if queries::delete_artifact_row(pool, &artifact.id).await? {
            deleted += 1;
        }
        // rows_affected 0 means a concurrent deleter won that item; the
        // object step above was an idempotent no-op, so just move on.
    }

    info!(deleted, "bulk artifact delete complete");
    Ok(deleted)
}
