use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::extract::{Json, Path, Query};
use crate::auth::AdminUser;
use crate::dto::{CreateVolunteerDto, MessageDto, UpdateVolunteerStatusDto, VolunteerQueryDto};
use crate::errors::ApiError;
use crate::models::Volunteer;
use crate::notify::{self, templates};
use crate::repo;
use crate::AppState;

/// Handler for the volunteer sign-up form
///
/// This function handles POST requests to `/volunteers`.
/// The admin inbox, when configured, is told about the new volunteer.
#[instrument(skip(state, payload))]
pub async fn create_volunteer_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVolunteerDto>,
) -> Result<Json<Volunteer>, ApiError> {
    let volunteer = repo::create_volunteer(&state.pool, payload).await?;

    if let Some(admin_email) = &state.config.admin_email {
        notify::notify(&state.pool, admin_email, templates::volunteer_signed_up(&volunteer)).await;
    }

    info!("Volunteer {} signed up", volunteer.get_id());

    Ok(Json(volunteer))
}

/// Handler for listing volunteers
///
/// This function handles GET requests to `/volunteers`.
#[instrument(skip(state, _admin, query))]
pub async fn list_volunteers_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<VolunteerQueryDto>,
) -> Result<Json<Vec<Volunteer>>, ApiError> {
    let volunteers = repo::list_volunteers(&state.pool, &query)?;
    debug!("Listed {} volunteers", volunteers.len());
    Ok(Json(volunteers))
}

/// Handler for updating a volunteer's status
///
/// This function handles PATCH requests to `/volunteers/{id}/status`.
#[instrument(skip(state, _admin, payload), fields(volunteer_id = %volunteer_id, status = %payload.status))]
pub async fn update_volunteer_status_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(volunteer_id): Path<String>,
    Json(payload): Json<UpdateVolunteerStatusDto>,
) -> Result<Json<Volunteer>, ApiError> {
    let volunteer = repo::update_volunteer_status(&state.pool, &volunteer_id, payload.status).await?;
    Ok(Json(volunteer))
}

/// Handler for deleting a volunteer record
///
/// This function handles DELETE requests to `/volunteers/{id}`.
#[instrument(skip(state, _admin), fields(volunteer_id = %volunteer_id))]
pub async fn delete_volunteer_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(volunteer_id): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    repo::delete_volunteer(&state.pool, &volunteer_id).await?;
    Ok(Json(MessageDto::new("Volunteer deleted")))
}
