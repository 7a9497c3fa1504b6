//! Media upload/delete proxy over the CMS file surface.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde_json::{Value, json};
use tienda_core::MediaId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::state::AppState;

/// POST /api/files - multipart upload, one or more `files` parts.
#[instrument(skip(state, _admin, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::BadRequest("file part has no filename".to_string()))?;
        let mime_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_owned(), str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read file part: {e}")))?;

        let assets = state
            .cms()
            .upload_file(&file_name, &mime_type, bytes.to_vec())
            .await?;
        uploaded.extend(assets);
    }

    if uploaded.is_empty() {
        return Err(AppError::BadRequest("no file parts in request".to_string()));
    }

    tracing::info!(count = uploaded.len(), "files uploaded");
    Ok(Json(json!(uploaded)))
}

/// DELETE /api/files/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.cms().delete_file(MediaId::new(id)).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
