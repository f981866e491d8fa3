use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::extract::{Json, MultiQuery, Path};
use crate::auth::{AdminUser, MaybeUser};
use crate::dto::{CreateShoeDto, MessageDto, ShoeQueryDto, UpdateShoeDto};
use crate::errors::ApiError;
use crate::models::{Shoe, ShoeDetails, ShoeStatus};
use crate::repo;
use crate::storage;
use crate::AppState;

/// Handler for browsing the shoe catalog
///
/// This function handles GET requests to `/shoes`.
/// Query parameters filter by status, gender, sport, brand, and free text;
/// `size` may be repeated. Hidden items are only ever shown to admins.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `viewer` - The signed-in user, if any
/// * `query` - Query parameters for filtering the results
///
/// ### Returns
///
/// The matching shoes as JSON, ordered by display number
#[instrument(skip(state, viewer, query))]
pub async fn list_shoes_handler(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    MultiQuery(mut query): MultiQuery<ShoeQueryDto>,
) -> Result<Json<Vec<Shoe>>, ApiError> {
    let admin = viewer.is_admin();
    if !admin {
        query.include_hidden = false;
    }

    let mut shoes = repo::list_shoes(&state.pool, &query)?;
    if !admin {
        shoes.retain(|shoe| shoe.get_status() != ShoeStatus::Hidden);
    }

    debug!("Listed {} shoes", shoes.len());

    Ok(Json(shoes))
}

/// Handler for retrieving a single shoe
///
/// This function handles GET requests to `/shoes/{id}`.
/// Hidden items are reported as not found unless the viewer is an admin.
#[instrument(skip(state, viewer), fields(shoe_id = %shoe_id))]
pub async fn get_shoe_handler(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(shoe_id): Path<String>,
) -> Result<Json<Shoe>, ApiError> {
    let shoe = repo::get_shoe(&state.pool, &shoe_id)?
        .filter(|shoe| viewer.is_admin() || shoe.get_status() != ShoeStatus::Hidden)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(shoe))
}

/// Handler for adding a shoe to inventory
///
/// This function handles POST requests to `/shoes`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `admin` - The admin making the change
/// * `payload` - The shoe's details, quantity, and optional source donation
///
/// ### Returns
///
/// The created shoe as JSON
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), name = %payload.name))]
pub async fn create_shoe_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(payload): Json<CreateShoeDto>,
) -> Result<Json<Shoe>, ApiError> {
    if let Some(key) = &payload.image_key {
        storage::validate_key(key)?;
    }

    let details = ShoeDetails {
        name: payload.name,
        brand: payload.brand,
        gender: payload.gender,
        size: payload.size,
        sport: payload.sport,
        condition: payload.condition,
        description: payload.description,
        image_key: payload.image_key,
    };

    let shoe = repo::create_shoe(&state.pool, details, payload.quantity, payload.hidden, payload.donation_id)?;

    info!("Added shoe #{}", shoe.get_display_id());

    Ok(Json(shoe))
}

/// Handler for editing a shoe
///
/// This function handles PATCH requests to `/shoes/{id}`.
/// Fields missing from the body are left unchanged; `hidden` hides or
/// unhides the item.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), shoe_id = %shoe_id))]
pub async fn update_shoe_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(shoe_id): Path<String>,
    Json(payload): Json<UpdateShoeDto>,
) -> Result<Json<Shoe>, ApiError> {
    if let Some(key) = &payload.image_key {
        storage::validate_key(key)?;
    }

    let shoe = repo::update_shoe(&state.pool, &shoe_id, payload).await?;
    Ok(Json(shoe))
}

/// Handler for removing a shoe from inventory
///
/// This function handles DELETE requests to `/shoes/{id}`.
/// Items that appear in any order cannot be deleted and answer 409.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.get_id(), shoe_id = %shoe_id))]
pub async fn delete_shoe_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(shoe_id): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    repo::delete_shoe(&state.pool, &shoe_id).await?;
    Ok(Json(MessageDto::new("Shoe deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use crate::test_utils::test_state;

    fn details(name: &str) -> ShoeDetails {
        ShoeDetails {
            name: name.to_string(),
            brand: "Asics".to_string(),
            gender: "Women".to_string(),
            size: "8".to_string(),
            sport: "Running".to_string(),
            condition: "Like new".to_string(),
            description: None,
            image_key: None,
        }
    }

    fn admin() -> MaybeUser {
        MaybeUser(Some(User::new("boss@example.org", "Boss".to_string(), String::new(), Role::Admin)))
    }

    #[tokio::test]
    async fn test_hidden_shoes_only_listed_for_admins() {
        let state = test_state();
        repo::create_shoe(&state.pool, details("Visible"), 2, false, None).unwrap();
        let hidden = repo::create_shoe(&state.pool, details("Secret"), 2, true, None).unwrap();

        let anonymous_query = ShoeQueryDto { include_hidden: true, ..Default::default() };
        let Json(shoes) = list_shoes_handler(State(state.clone()), MaybeUser(None), MultiQuery(anonymous_query))
            .await
            .unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].get_name(), "Visible");

        let status_query = ShoeQueryDto { status: Some(ShoeStatus::Hidden), ..Default::default() };
        let Json(shoes) = list_shoes_handler(State(state.clone()), MaybeUser(None), MultiQuery(status_query))
            .await
            .unwrap();
        assert!(shoes.is_empty());

        let admin_query = ShoeQueryDto { include_hidden: true, ..Default::default() };
        let Json(shoes) = list_shoes_handler(State(state.clone()), admin(), MultiQuery(admin_query))
            .await
            .unwrap();
        assert_eq!(shoes.len(), 2);

        let result = get_shoe_handler(State(state.clone()), MaybeUser(None), Path(hidden.get_id())).await;
        assert!(matches!(result, Err(ApiError::NotFound)));

        let Json(found) = get_shoe_handler(State(state.clone()), admin(), Path(hidden.get_id()))
            .await
            .unwrap();
        assert_eq!(found.get_id(), hidden.get_id());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_image_key() {
        let state = test_state();
        let admin = AdminUser(User::new("boss@example.org", "Boss".to_string(), String::new(), Role::Admin));

        let payload = CreateShoeDto {
            name: "Spikes".to_string(),
            brand: "Nike".to_string(),
            gender: "Men".to_string(),
            size: "10".to_string(),
            sport: "Track".to_string(),
            condition: "Good".to_string(),
            description: None,
            image_key: Some("../etc/passwd".to_string()),
            quantity: 1,
            hidden: false,
            donation_id: None,
        };

        let result = create_shoe_handler(State(state), admin, Json(payload)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
