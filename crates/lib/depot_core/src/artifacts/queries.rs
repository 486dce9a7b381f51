//! Artifact metadata queries.
//!
//! Row mutation goes through `pipeline` only; these are the raw statements.

use sqlx::PgPool;

use super::ArtifactError;
use crate::models::artifact::Artifact;

type ArtifactRow = (
    String,
    String,
    String,
    String,
    chrono::DateTime<chrono::Utc>,
);

fn from_row((id, name, object_key, uploaded_by, uploaded_at): ArtifactRow) -> Artifact {
    Artifact {
        id,
        name,
        object_key,
        uploaded_by,
        uploaded_at,
    }
}

/// Insert a metadata row for an already-written object.
pub async fn insert_artifact(
    pool: &PgPool,
    id: &str,
    name: &str,
    object_key: &str,
    uploaded_by: &str,
) -> Result<Artifact, ArtifactError> {
    let row = sqlx::query_as::<_, ArtifactRow>(
        "INSERT INTO artifacts (id, name, object_key, uploaded_by) \
         VALUES ($1::uuid, $2, $3, $4) \
         RETURNING id::text, name, object_key, uploaded_by, uploaded_at",
    )
    .bind(id)
    .bind(name)
    .bind(object_key)
    .bind(uploaded_by)
    .fetch_one(pool)
    .await?;
    Ok(from_row(row))
}

/// Fetch one artifact by id.
pub async fn get_artifact(pool: &PgPool, id: &str) -> Result<Option<Artifact>, ArtifactError> {
    if uuid::Uuid::parse_str(id).is_err() {
        return Ok(None);
    }
    let row = sqlx::query_as::<_, ArtifactRow>(
        "SELECT id::text, name, object_key, uploaded_by, uploaded_at \
         FROM artifacts WHERE id = $1::uuid",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(from_row))
}

/// List all artifacts, newest first. UUIDv7 ids make the `id DESC` tie-break
/// follow insertion order.
pub async fn list_artifacts(pool: &PgPool) -> Result<Vec<Artifact>, ArtifactError> {
    let rows = sqlx::query_as::<_, ArtifactRow>(
        "SELECT id::text, name, object_key, uploaded_by, uploaded_at \
         FROM artifacts ORDER BY uploaded_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// Compare-and-delete one row. Returns `false` when the row was already
/// gone — under concurrent deletion exactly one caller sees `true`.
pub async fn delete_artifact_row(pool: &PgPool, id: &str) -> Result<bool, ArtifactError> {
    let result = sqlx::query("DELETE FROM artifacts WHERE id = $1::uuid")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
