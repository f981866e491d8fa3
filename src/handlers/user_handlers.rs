use axum::extract::State;
use std::sync::Arc;
use tracing::{info, instrument};

use super::extract::{Json, Path};
use crate::auth::AdminUser;
use crate::dto::UpdateRoleDto;
use crate::errors::ApiError;
use crate::models::{Role, User};
use crate::repo;
use crate::AppState;

/// Handler for listing accounts
///
/// This function handles GET requests to `/users`.
#[instrument(skip(state, _admin))]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(repo::list_users(&state.pool)?))
}

/// Handler for changing an account's role
///
/// This function handles PATCH requests to `/users/{id}/role`.
/// Admins cannot demote themselves, so the site always keeps at least the
/// admin making the change.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), user_id = %user_id, role = %payload.role))]
pub async fn update_user_role_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateRoleDto>,
) -> Result<Json<User>, ApiError> {
    if user_id == admin.0.get_id() && payload.role != Role::Admin {
        return Err(ApiError::Validation("You cannot remove your own admin role".to_string()));
    }

    let user = repo::update_user_role(&state.pool, &user_id, payload.role).await?;
    info!("User {} is now {}", user.get_id(), user.get_role());
    Ok(Json(user))
}
