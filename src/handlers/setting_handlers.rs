use axum::extract::State;
use std::sync::Arc;
use tracing::{info, instrument};

use super::extract::{Json, Path};
use crate::auth::AdminUser;
use crate::dto::{MessageDto, UpdateSettingDto};
use crate::errors::ApiError;
use crate::models::Setting;
use crate::repo;
use crate::AppState;

/// Handler for listing site settings
///
/// This function handles GET requests to `/settings`.
#[instrument(skip(state))]
pub async fn list_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    Ok(Json(repo::list_settings(&state.pool)?))
}

/// Handler for reading one setting
///
/// This function handles GET requests to `/settings/{key}`.
#[instrument(skip(state), fields(key = %key))]
pub async fn get_setting_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, ApiError> {
    let setting = repo::get_setting(&state.pool, &key)?.ok_or(ApiError::NotFound)?;
    Ok(Json(setting))
}

/// Handler for writing a setting
///
/// This function handles PUT requests to `/settings/{key}`. The value may
/// be any JSON document and replaces the previous one.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), key = %key))]
pub async fn put_setting_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(key): Path<String>,
    Json(payload): Json<UpdateSettingDto>,
) -> Result<Json<Setting>, ApiError> {
    let setting = repo::upsert_setting(&state.pool, &key, payload.value)?;
    info!("Setting {} updated", key);
    Ok(Json(setting))
}

/// Handler for deleting a setting
///
/// This function handles DELETE requests to `/settings/{key}`.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.get_id(), key = %key))]
pub async fn delete_setting_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(key): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    repo::delete_setting(&state.pool, &key).await?;
    Ok(Json(MessageDto::new("Setting deleted")))
}
