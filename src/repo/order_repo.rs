use std::collections::HashMap;

use crate::db::DbPool;
use crate::dto::{CreateOrderDto, OrderLineDto, OrderQueryDto};
use crate::models::{Order, OrderItem, OrderStatus, OrderWithItems, ShippingAddress};
use crate::reference::{generate_reference, ReferenceKind, MAX_REFERENCE_ATTEMPTS};
use crate::schema::{order_items, orders};
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::{Result, anyhow};
use tracing::{instrument, debug, info};

use super::shoe_repo::{release_stock, reserve_stock};
use super::{require_text, RepoError};

/// Merges repeated lines for the same shoe, keeping first-seen order
///
/// Every line and every merged total must stay within `max_items`.
fn merge_lines(lines: &[OrderLineDto], max_items: i32) -> Result<Vec<(String, i32)>, RepoError> {
    if lines.is_empty() {
        return Err(RepoError::Validation("An order needs at least one item".to_string()));
    }

    let too_many = || RepoError::Validation(format!("An order can include at most {} pairs", max_items));
    let mut merged: Vec<(String, i32)> = Vec::new();
    for line in lines {
        if line.quantity < 1 {
            return Err(RepoError::Validation("Item quantity must be at least 1".to_string()));
        }
        if line.quantity > max_items {
            return Err(too_many());
        }
        match merged.iter_mut().find(|(id, _)| *id == line.shoe_id) {
            Some((_, quantity)) => {
                *quantity = quantity.checked_add(line.quantity).ok_or_else(too_many)?;
            }
            None => merged.push((line.shoe_id.clone(), line.quantity)),
        }
    }
    Ok(merged)
}

fn validate_address(address: &ShippingAddress) -> Result<(), RepoError> {
    require_text("Shipping name", &address.name)?;
    require_text("Address", &address.address_line1)?;
    require_text("City", &address.city)?;
    require_text("State", &address.state)?;
    require_text("Postal code", &address.postal_code)?;
    require_text("Country", &address.country)?;
    Ok(())
}

fn unused_reference(conn: &mut SqliteConnection) -> Result<String> {
    for _ in 0..MAX_REFERENCE_ATTEMPTS {
        let reference = generate_reference(ReferenceKind::Order);
        let taken: i64 = orders::table
            .filter(orders::reference_id.eq(&reference))
            .count()
            .get_result(conn)?;
        if taken == 0 {
            return Ok(reference);
        }
        debug!("Reference {} already taken", reference);
    }
    Err(anyhow!("Could not generate a unique order reference"))
}

fn load_items(conn: &mut SqliteConnection, order_id: &str) -> QueryResult<Vec<OrderItem>> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .load::<OrderItem>(conn)
}

/// Attaches lines to a batch of orders with a single items query
fn with_items(conn: &mut SqliteConnection, orders: Vec<Order>) -> QueryResult<Vec<OrderWithItems>> {
    let ids: Vec<String> = orders.iter().map(|o| o.get_id()).collect();
    let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for item in order_items::table
        .filter(order_items::order_id.eq_any(ids))
        .load::<OrderItem>(conn)?
    {
        items_by_order.entry(item.order_id.clone()).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.get_id()).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}

/// Places an order, reserving stock for every line
///
/// Stock checks, decrements, and the order rows are written in one
/// immediate transaction: either every line is reserved and the order
/// exists, or nothing changes.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `recipient_id` - The account placing the order
/// * `dto` - Requested lines, shipping address, and notes
/// * `max_items` - Most pairs allowed across all lines
///
/// ### Errors
///
/// Returns an error if:
/// - The lines or the address are invalid, or too many pairs are requested (`RepoError::Validation`)
/// - A shoe does not exist (`RepoError::NotFound`)
/// - A shoe is hidden, out of stock, or short of pairs (`RepoError::InsufficientStock`)
/// - The database operation fails
#[instrument(skip(pool, dto), fields(recipient_id = %recipient_id, lines = dto.items.len()))]
pub fn place_order(pool: &DbPool, recipient_id: &str, dto: CreateOrderDto, max_items: i32) -> Result<OrderWithItems> {
    debug!("Placing order");

    let lines = merge_lines(&dto.items, max_items)?;
    let total = lines
        .iter()
        .try_fold(0i32, |sum, (_, quantity)| sum.checked_add(*quantity))
        .filter(|total| *total <= max_items)
        .ok_or_else(|| {
            RepoError::Validation(format!("An order can include at most {} pairs", max_items))
        })?;
    validate_address(&dto.shipping)?;

    let conn = &mut pool.get()?;

    let placed = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        for (shoe_id, quantity) in &lines {
            reserve_stock(conn, shoe_id, *quantity)?;
        }

        let order = Order::new(
            unused_reference(conn)?,
            recipient_id.to_string(),
            dto.shipping,
            dto.notes,
        );
        diesel::insert_into(orders::table)
            .values(order.clone())
            .execute(conn)?;

        let items: Vec<OrderItem> = lines
            .into_iter()
            .map(|(shoe_id, quantity)| OrderItem {
                order_id: order.get_id(),
                shoe_id,
                quantity,
            })
            .collect();
        diesel::insert_into(order_items::table)
            .values(items.clone())
            .execute(conn)?;

        Ok(OrderWithItems { order, items })
    })?;

    info!(
        "Placed order {} with {} pairs",
        placed.order.get_reference_id(),
        total
    );

    Ok(placed)
}

/// Retrieves an order with its lines
#[instrument(skip(pool), fields(order_id = %order_id))]
pub fn get_order(pool: &DbPool, order_id: &str) -> Result<Option<OrderWithItems>> {
    debug!("Retrieving order by id");

    let conn = &mut pool.get()?;

    let Some(order) = orders::table
        .find(order_id)
        .first::<Order>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let items = load_items(conn, order_id)?;

    Ok(Some(OrderWithItems { order, items }))
}

/// Lists orders matching the query, newest first
#[instrument(skip(pool, query))]
pub fn list_orders(pool: &DbPool, query: &OrderQueryDto) -> Result<Vec<OrderWithItems>> {
    debug!("Listing orders with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let mut order_query = orders::table.into_boxed();
    if let Some(status) = query.status {
        order_query = order_query.filter(orders::status.eq(status));
    }

    let found = order_query
        .order(orders::created_at.desc())
        .load::<Order>(conn)?;

    info!("Retrieved {} orders", found.len());

    Ok(with_items(conn, found)?)
}

/// Lists the orders placed by an account, newest first
#[instrument(skip(pool), fields(recipient_id = %recipient_id))]
pub fn list_orders_for_recipient(pool: &DbPool, recipient_id: &str) -> Result<Vec<OrderWithItems>> {
    debug!("Listing orders for recipient");

    let conn = &mut pool.get()?;

    let found = orders::table
        .filter(orders::recipient_id.eq(recipient_id))
        .order(orders::created_at.desc())
        .load::<Order>(conn)?;

    Ok(with_items(conn, found)?)
}

/// Checks and applies a status change inside a caller's transaction,
/// returning reserved stock when the order is cancelled
fn apply_transition(
    conn: &mut SqliteConnection,
    order: &Order,
    next: OrderStatus,
    note: Option<String>,
) -> Result<OrderWithItems> {
    let current = order.get_status();
    if !current.can_transition_to(next) {
        return Err(RepoError::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    let items = load_items(conn, &order.get_id())?;
    if next == OrderStatus::Cancelled {
        for item in &items {
            release_stock(conn, &item.shoe_id, item.quantity)?;
        }
    }

    let now = Utc::now();
    let mut history = order.get_status_history().clone();
    history.push(next, now, note);

    diesel::update(orders::table.find(order.get_id()))
        .set((
            orders::status.eq(next),
            orders::status_history.eq(history),
            orders::updated_at.eq(now.naive_utc()),
        ))
        .execute(conn)?;

    let order = orders::table.find(order.get_id()).first::<Order>(conn)?;

    Ok(OrderWithItems { order, items })
}

fn find_order(conn: &mut SqliteConnection, order_id: &str) -> Result<Order> {
    Ok(orders::table
        .find(order_id)
        .first::<Order>(conn)
        .optional()?
        .ok_or_else(|| RepoError::NotFound(format!("Order {}", order_id)))?)
}

/// Moves an order to a new status and records it in the history
///
/// Cancelling puts every line's pairs back into stock in the same
/// transaction.
///
/// ### Errors
///
/// Returns `RepoError::NotFound` if the order does not exist and
/// `RepoError::InvalidTransition` if the lifecycle does not allow the move.
#[instrument(skip(pool, note), fields(order_id = %order_id, next = %next))]
pub fn transition_order(
    pool: &DbPool,
    order_id: &str,
    next: OrderStatus,
    note: Option<String>,
) -> Result<OrderWithItems> {
    debug!("Transitioning order");

    let conn = &mut pool.get()?;

    let updated = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let order = find_order(conn, order_id)?;
        apply_transition(conn, &order, next, note)
    })?;

    info!("Order {} is now {}", updated.order.get_reference_id(), next);

    Ok(updated)
}

/// Cancels an order on behalf of the recipient who placed it
///
/// Recipients may only cancel while the order is still pending. Orders of
/// other accounts are reported as not found.
#[instrument(skip(pool), fields(order_id = %order_id, recipient_id = %recipient_id))]
pub fn cancel_order_for_recipient(pool: &DbPool, order_id: &str, recipient_id: &str) -> Result<OrderWithItems> {
    debug!("Recipient cancelling order");

    let conn = &mut pool.get()?;

    let updated = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let order = find_order(conn, order_id)?;
        if !order.is_owned_by(recipient_id) {
            return Err(RepoError::NotFound(format!("Order {}", order_id)).into());
        }
        if order.get_status() != OrderStatus::Pending {
            return Err(RepoError::InvalidTransition {
                from: order.get_status().to_string(),
                to: OrderStatus::Cancelled.to_string(),
            }
            .into());
        }
        apply_transition(conn, &order, OrderStatus::Cancelled, Some("Cancelled by recipient".to_string()))
    })?;

    info!("Order {} cancelled by recipient", updated.order.get_reference_id());

    Ok(updated)
}
