use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::extract::{Json, Path};
use crate::auth::AdminUser;
use crate::dto::{MessageDto, UploadResponseDto};
use crate::errors::ApiError;
use crate::models::Upload;
use crate::repo;
use crate::storage;
use crate::AppState;

/// Name of the multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Handler for uploading an image
///
/// This function handles POST requests to `/uploads` with a
/// `multipart/form-data` body containing a `file` field.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `admin` - The admin uploading the file
/// * `multipart` - The request body
///
/// ### Returns
///
/// The new key and the path the file is served from, as JSON
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.0.get_id()))]
pub async fn create_upload_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Validation("The file has no content type".to_string()))?;
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;

        let key = state.storage.save(&content_type, &bytes).await?;
        let upload = Upload::new(
            key.clone(),
            original_name,
            storage::content_type_for_key(&key).unwrap_or("application/octet-stream").to_string(),
            bytes.len() as i64,
            Some(admin.0.get_id()),
        );

        if let Err(e) = repo::record_upload(&state.pool, upload.clone()).await {
            if let Err(cleanup) = state.storage.delete(&key).await {
                warn!("Could not remove orphaned upload {}: {}", key, cleanup);
            }
            return Err(e.into());
        }

        info!("Uploaded {} ({} bytes)", key, upload.get_size_bytes());

        return Ok(Json(UploadResponseDto {
            url: format!("/uploads/{}", key),
            key,
            content_type: upload.get_content_type(),
            size_bytes: upload.get_size_bytes(),
        }));
    }

    Err(ApiError::Validation(format!("Missing multipart field \"{}\"", FILE_FIELD)))
}

/// Handler for serving an uploaded file
///
/// This function handles GET requests to `/uploads/{key}`.
#[instrument(skip(state), fields(key = %key))]
pub async fn get_upload_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.storage.read(&key).await?;
    let content_type = storage::content_type_for_key(&key).unwrap_or("application/octet-stream");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}

/// Handler for listing uploaded files
///
/// This function handles GET requests to `/uploads`.
#[instrument(skip(state, _admin))]
pub async fn list_uploads_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<Upload>>, ApiError> {
    Ok(Json(repo::list_uploads(&state.pool)?))
}

/// Handler for deleting an uploaded file
///
/// This function handles DELETE requests to `/uploads/{key}`.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.get_id(), key = %key))]
pub async fn delete_upload_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(key): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    storage::validate_key(&key)?;
    repo::delete_upload(&state.pool, &key).await?;
    state.storage.delete(&key).await?;
    Ok(Json(MessageDto::new("Upload deleted")))
}
