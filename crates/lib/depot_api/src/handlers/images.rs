//! Artifact (image) request handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use depot_core::artifacts::pipeline;
use depot_core::models::artifact::Artifact;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Caller;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub image: Artifact,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<Artifact>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: Artifact,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /upload` — ingest a multipart artifact upload.
///
/// The body is staged to a scoped temp file first, so a client disconnect
/// mid-upload fails here and never reaches the object store or the metadata
/// table. The temp file is released on every path when the guard drops.
pub async fn upload_handler(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<Caller>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("Malformed multipart body".into()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let display_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("Missing file name".into()))?;

        // Stage the stream to disk; the guard deletes the file on drop.
        let staging = tempfile::NamedTempFile::new()
            .map_err(|e| AppError::Internal(format!("staging file: {e}")))?;
        let mut out = tokio::fs::File::create(staging.path())
            .await
            .map_err(|e| AppError::Internal(format!("staging file: {e}")))?;

        let mut field = field;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| AppError::Validation("Malformed multipart body".into()))?
        {
            out.write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("staging write: {e}")))?;
        }
        out.flush()
            .await
            .map_err(|e| AppError::Internal(format!("staging write: {e}")))?;
        drop(out);

        let artifact = pipeline::ingest(
            &state.pool,
            state.store.as_ref(),
            staging.path(),
            &display_name,
            &caller.0,
        )
        .await?;

        return Ok(Json(UploadResponse {
            message: "Image uploaded successfully".into(),
            image: artifact,
        }));
    }

    Err(AppError::Validation("Missing 'file' field".into()))
}

/// `GET /images` — list all artifacts, newest first.
pub async fn list_images_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ImageListResponse>> {
    let images = pipeline::list(&state.pool).await?;
    Ok(Json(ImageListResponse { images }))
}

/// `GET /images/{id}` — one artifact's metadata.
pub async fn get_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ImageResponse>> {
    let image = pipeline::get(&state.pool, &id).await?;
    Ok(Json(ImageResponse { image }))
}

/// `DELETE /images/{id}` — remove the object, then the metadata row.
pub async fn delete_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    pipeline::delete(&state.pool, state.store.as_ref(), &id).await?;
    Ok(Json(MessageResponse {
        message: "Image deleted successfully".into(),
    }))
}

/// `DELETE /delete-all-images` — bulk delete, object-then-row per item.
pub async fn delete_all_images_handler(
    State(state): State<AppState>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = pipeline::delete_all(&state.pool, state.store.as_ref()).await?;
    let message = if deleted == 0 {
        "No images found to delete.".into()
    } else {
        "All images deleted successfully.".into()
    };
    Ok(Json(MessageResponse { message }))
}
