use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::extract::{Json, Path, Query};
use crate::auth::{AdminUser, AuthUser, MaybeUser};
use crate::dto::{CreateDonationDto, DonationQueryDto, MessageDto, UpdateDonationStatusDto};
use crate::errors::ApiError;
use crate::models::{Donation, User};
use crate::notify::{self, templates};
use crate::repo;
use crate::AppState;

/// Whether `user` may see `donation`
///
/// Donors only see donations made while signed in to their account. Signed
/// out donations are reached by reference ID, never by a matching email.
fn can_view(donation: &Donation, user: &User) -> bool {
    user.is_admin() || donation.is_owned_by(&user.get_id())
}

/// Handler for submitting a donation
///
/// This function handles POST requests to `/donations`.
/// Donors may be signed in or anonymous; signed-in donations are linked to
/// the account. A confirmation email with the reference is queued.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `donor` - The signed-in user, if any
/// * `payload` - The donor's contact details and what they are giving
///
/// ### Returns
///
/// The recorded donation, including its reference, as JSON
#[instrument(skip(state, donor, payload), fields(kind = %payload.kind))]
pub async fn create_donation_handler(
    State(state): State<Arc<AppState>>,
    donor: MaybeUser,
    Json(payload): Json<CreateDonationDto>,
) -> Result<Json<Donation>, ApiError> {
    info!("Recording new donation");

    let donation = repo::create_donation(&state.pool, donor.user_id(), payload).await?;

    let message = templates::donation_received(&donation, &state.config.public_url);
    notify::notify(&state.pool, &donation.get_donor_email(), message).await;

    info!("Recorded donation {}", donation.get_reference_id());

    Ok(Json(donation))
}

/// Handler for listing the signed-in donor's donations
///
/// This function handles GET requests to `/donations/mine`.
#[instrument(skip(state, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_my_donations_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let donations = repo::list_donations_for_donor(&state.pool, &auth.user.get_id())?;
    debug!("Found {} donations", donations.len());
    Ok(Json(donations))
}

/// Handler for retrieving a donation by ID
///
/// This function handles GET requests to `/donations/{id}`.
/// Donations of other donors are reported as not found.
#[instrument(skip(state, auth), fields(donation_id = %donation_id))]
pub async fn get_donation_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(donation_id): Path<String>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::get_donation(&state.pool, &donation_id)?
        .filter(|donation| can_view(donation, &auth.user))
        .ok_or(ApiError::NotFound)?;
    Ok(Json(donation))
}

/// Handler for retrieving a donation by its reference
///
/// This function handles GET requests to `/donations/reference/{reference_id}`.
/// The reference is matched case-insensitively.
#[instrument(skip(state, auth), fields(reference_id = %reference_id))]
pub async fn get_donation_by_reference_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(reference_id): Path<String>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::get_donation_by_reference(&state.pool, &reference_id)?
        .filter(|donation| can_view(donation, &auth.user))
        .ok_or(ApiError::NotFound)?;
    Ok(Json(donation))
}

/// Handler for listing all donations
///
/// This function handles GET requests to `/donations`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `_admin` - The admin making the request
/// * `query` - Filters on status, kind, and donor/reference text
///
/// ### Returns
///
/// The matching donations as JSON, newest first
#[instrument(skip(state, _admin, query))]
pub async fn list_donations_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<DonationQueryDto>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let donations = repo::list_donations(&state.pool, &query)?;
    debug!("Listed {} donations", donations.len());
    Ok(Json(donations))
}

/// Handler for moving a donation through its lifecycle
///
/// This function handles PATCH requests to `/donations/{id}/status`.
/// The donor is emailed about the change.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), donation_id = %donation_id, status = %payload.status))]
pub async fn update_donation_status_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(donation_id): Path<String>,
    Json(payload): Json<UpdateDonationStatusDto>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::transition_donation(&state.pool, &donation_id, payload.status, payload.note)?;

    let message = templates::donation_status_changed(&donation);
    notify::notify(&state.pool, &donation.get_donor_email(), message).await;

    Ok(Json(donation))
}

/// Handler for deleting a donation
///
/// This function handles DELETE requests to `/donations/{id}`.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.get_id(), donation_id = %donation_id))]
pub async fn delete_donation_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(donation_id): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    repo::delete_donation(&state.pool, &donation_id).await?;
    Ok(Json(MessageDto::new("Donation deleted")))
}
