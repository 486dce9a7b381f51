//! Artifact domain model.

use serde::{Deserialize, Serialize};

/// A stored binary object plus its descriptive metadata row.
///
/// Invariant: while this row exists, `object_key` resolves to an object in
/// the blob store. The artifact pipeline is the only writer of these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    /// Original display name supplied at upload.
    pub name: String,
    /// Key addressing the blob in the object store.
    pub object_key: String,
    /// Email of the uploading user, or `"automation"`.
    pub uploaded_by: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
