use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::extract::{Json, Path, Query};
use crate::auth::{AdminUser, AuthUser};
use crate::dto::{CreateOrderDto, OrderQueryDto, UpdateOrderStatusDto};
use crate::errors::ApiError;
use crate::models::OrderWithItems;
use crate::notify::{self, templates};
use crate::repo;
use crate::AppState;

/// Emails the recipient of an order, if their account still exists
async fn notify_recipient(state: &AppState, order: &OrderWithItems, message: templates::Message) {
    match repo::get_user(&state.pool, &order.order.get_recipient_id()) {
        Ok(Some(recipient)) => notify::notify(&state.pool, &recipient.get_email(), message).await,
        Ok(None) => debug!("Recipient of {} no longer exists", order.order.get_reference_id()),
        Err(e) => warn!("Could not look up recipient of {}: {:#}", order.order.get_reference_id(), e),
    }
}

/// Handler for placing an order
///
/// This function handles POST requests to `/orders`.
/// Stock for every line is reserved in the same transaction that records
/// the order. The recipient gets a confirmation and the admin inbox, when
/// configured, gets a notice.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `auth` - The recipient placing the order
/// * `payload` - The requested shoes and the shipping address
///
/// ### Returns
///
/// The order and its lines as JSON
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user.get_id(), lines = payload.items.len()))]
pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateOrderDto>,
) -> Result<Json<OrderWithItems>, ApiError> {
    info!("Placing order");

    let order = repo::place_order(
        &state.pool,
        &auth.user.get_id(),
        payload,
        state.config.max_items_per_order,
    )?;

    notify::notify(&state.pool, &auth.user.get_email(), templates::order_placed(&order)).await;
    if let Some(admin_email) = &state.config.admin_email {
        let message = templates::order_placed_admin(&order, &auth.user.get_email(), &state.config.public_url);
        notify::notify(&state.pool, admin_email, message).await;
    }

    Ok(Json(order))
}

/// Handler for listing the signed-in recipient's orders
///
/// This function handles GET requests to `/orders/mine`.
#[instrument(skip(state, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_my_orders_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    let orders = repo::list_orders_for_recipient(&state.pool, &auth.user.get_id())?;
    debug!("Found {} orders", orders.len());
    Ok(Json(orders))
}

/// Handler for retrieving an order
///
/// This function handles GET requests to `/orders/{id}`.
/// Orders of other recipients are reported as not found.
#[instrument(skip(state, auth), fields(order_id = %order_id))]
pub async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = repo::get_order(&state.pool, &order_id)?
        .filter(|order| auth.user.is_admin() || order.order.is_owned_by(&auth.user.get_id()))
        .ok_or(ApiError::NotFound)?;
    Ok(Json(order))
}

/// Handler for a recipient cancelling their own order
///
/// This function handles POST requests to `/orders/{id}/cancel`.
/// Only pending orders can be cancelled this way; the pairs go back into
/// stock.
#[instrument(skip(state, auth), fields(user_id = %auth.user.get_id(), order_id = %order_id))]
pub async fn cancel_order_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = repo::cancel_order_for_recipient(&state.pool, &order_id, &auth.user.get_id())?;
    notify::notify(&state.pool, &auth.user.get_email(), templates::order_status_changed(&order)).await;
    Ok(Json(order))
}

/// Handler for listing all orders
///
/// This function handles GET requests to `/orders`.
#[instrument(skip(state, _admin, query))]
pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<OrderQueryDto>,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    let orders = repo::list_orders(&state.pool, &query)?;
    debug!("Listed {} orders", orders.len());
    Ok(Json(orders))
}

/// Handler for moving an order through its lifecycle
///
/// This function handles PATCH requests to `/orders/{id}/status`.
/// Cancelling restores stock. The recipient is emailed about the change.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), order_id = %order_id, status = %payload.status))]
pub async fn update_order_status_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateOrderStatusDto>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = repo::transition_order(&state.pool, &order_id, payload.status, payload.note)?;
    notify_recipient(&state, &order, templates::order_status_changed(&order)).await;
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::OrderLineDto;
    use crate::models::{OrderStatus, Role, ShippingAddress, ShoeDetails, User};
    use crate::test_utils::test_state;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Lee Park".to_string(),
            address_line1: "12 Elm St".to_string(),
            address_line2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            phone: None,
        }
    }

    async fn recipient(state: &AppState) -> AuthUser {
        let user = repo::create_user(&state.pool, "lee@example.org", "Lee", "password123", Role::User)
            .await
            .unwrap();
        AuthUser { user, token_hash: String::new() }
    }

    fn stocked_shoe(state: &AppState, quantity: i32) -> String {
        let details = ShoeDetails {
            name: "Trainers".to_string(),
            brand: "Brooks".to_string(),
            gender: "Unisex".to_string(),
            size: "9".to_string(),
            sport: "Running".to_string(),
            condition: "Good".to_string(),
            description: None,
            image_key: None,
        };
        repo::create_shoe(&state.pool, details, quantity, false, None).unwrap().get_id()
    }

    #[tokio::test]
    async fn test_place_order_notifies_recipient_and_admin() {
        let state = test_state();
        let auth = recipient(&state).await;
        let shoe_id = stocked_shoe(&state, 3);

        let Json(order) = create_order_handler(
            State(state.clone()),
            auth,
            Json(CreateOrderDto {
                items: vec![OrderLineDto { shoe_id: shoe_id.clone(), quantity: 1 }],
                shipping: address(),
                notes: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(order.order.get_status(), OrderStatus::Pending);
        assert_eq!(repo::get_shoe(&state.pool, &shoe_id).unwrap().unwrap().get_quantity(), 2);

        let mut recipients: Vec<String> = repo::pending_emails(&state.pool, 10)
            .unwrap()
            .iter()
            .map(|email| email.get_recipient().to_string())
            .collect();
        recipients.sort();
        assert_eq!(recipients, vec!["admin-inbox@example.org", "lee@example.org"]);
    }

    #[tokio::test]
    async fn test_other_recipients_cannot_see_order() {
        let state = test_state();
        let auth = recipient(&state).await;
        let shoe_id = stocked_shoe(&state, 1);
        let order = repo::place_order(
            &state.pool,
            &auth.user.get_id(),
            CreateOrderDto {
                items: vec![OrderLineDto { shoe_id, quantity: 1 }],
                shipping: address(),
                notes: None,
            },
            2,
        )
        .unwrap();

        let stranger = AuthUser {
            user: User::new("max@example.org", "Max".to_string(), String::new(), Role::User),
            token_hash: String::new(),
        };
        let result = get_order_handler(State(state.clone()), stranger, Path(order.order.get_id())).await;
        assert!(matches!(result, Err(ApiError::NotFound)));

        let Json(own) = get_order_handler(State(state.clone()), auth, Path(order.order.get_id()))
            .await
            .unwrap();
        assert_eq!(own.order.get_id(), order.order.get_id());
    }
}
