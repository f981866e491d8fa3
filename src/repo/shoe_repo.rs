use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{ShoeQueryDto, UpdateShoeDto};
use crate::models::{Shoe, ShoeDetails, ShoeStatus};
use crate::schema::{donations, order_items, shoes};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::Result;
use tracing::{instrument, debug, info, warn};

use super::{require_text, RepoError};

/// Column updates for an inventory item; `None` leaves a column untouched
#[derive(AsChangeset, Clone, Debug)]
#[diesel(table_name = shoes)]
struct ShoeChangeset {
    name: Option<String>,
    brand: Option<String>,
    gender: Option<String>,
    size: Option<String>,
    sport: Option<String>,
    condition: Option<String>,
    description: Option<String>,
    image_key: Option<String>,
    quantity: Option<i32>,
    status: Option<ShoeStatus>,
    updated_at: NaiveDateTime,
}

fn validate_details(details: &ShoeDetails) -> Result<(), RepoError> {
    require_text("Name", &details.name)?;
    require_text("Brand", &details.brand)?;
    require_text("Gender", &details.gender)?;
    require_text("Size", &details.size)?;
    require_text("Sport", &details.sport)?;
    require_text("Condition", &details.condition)?;
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), RepoError> {
    if quantity < 0 {
        return Err(RepoError::Validation("Quantity cannot be negative".to_string()));
    }
    Ok(())
}

/// Adds a new item to the inventory
///
/// The item gets the next sequential display number. Its status is
/// `Hidden` when `hidden` is set and otherwise follows the quantity.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `details` - Descriptive fields of the shoe
/// * `quantity` - Pairs on hand
/// * `hidden` - Keep the item out of the public catalog
/// * `donation_id` - The donation the shoes came from, if any
///
/// ### Errors
///
/// Returns an error if:
/// - A required field is empty or the quantity is negative (`RepoError::Validation`)
/// - The referenced donation does not exist (`RepoError::NotFound`)
/// - The database operation fails
#[instrument(skip(pool, details), fields(name = %details.name, quantity = %quantity))]
pub fn create_shoe(
    pool: &DbPool,
    details: ShoeDetails,
    quantity: i32,
    hidden: bool,
    donation_id: Option<String>,
) -> Result<Shoe> {
    debug!("Creating new shoe");

    validate_details(&details)?;
    validate_quantity(quantity)?;

    let conn = &mut pool.get()?;

    let shoe = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        if let Some(donation_id) = &donation_id {
            let exists: i64 = donations::table
                .filter(donations::id.eq(donation_id))
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(RepoError::NotFound(format!("Donation {}", donation_id)).into());
            }
        }

        let last_display_id: Option<i32> = shoes::table
            .select(diesel::dsl::max(shoes::display_id))
            .first(conn)?;

        let shoe = Shoe::new(last_display_id.unwrap_or(0) + 1, details, quantity, hidden, donation_id);

        diesel::insert_into(shoes::table)
            .values(shoe.clone())
            .execute(conn)?;

        Ok(shoe)
    })?;

    info!("Created shoe #{} with id: {}", shoe.get_display_id(), shoe.get_id());

    Ok(shoe)
}

/// Retrieves an inventory item by ID
#[instrument(skip(pool), fields(shoe_id = %shoe_id))]
pub fn get_shoe(pool: &DbPool, shoe_id: &str) -> Result<Option<Shoe>> {
    debug!("Retrieving shoe by id");

    let conn = &mut pool.get()?;

    let result = shoes::table
        .find(shoe_id)
        .first::<Shoe>(conn)
        .optional()?;

    Ok(result)
}

/// Lists inventory items matching the query, in display order
///
/// Hidden items are left out unless `include_hidden` is set or the query
/// asks for the hidden status explicitly. Text filters match
/// case-insensitively.
#[instrument(skip(pool, query))]
pub fn list_shoes(pool: &DbPool, query: &ShoeQueryDto) -> Result<Vec<Shoe>> {
    debug!("Listing shoes with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let mut shoe_query = shoes::table.into_boxed();

    match query.status {
        Some(status) => {
            shoe_query = shoe_query.filter(shoes::status.eq(status));
        }
        None if !query.include_hidden => {
            shoe_query = shoe_query.filter(shoes::status.ne(ShoeStatus::Hidden));
        }
        None => {}
    }

    // SQLite LIKE without wildcards is a case-insensitive equality
    if let Some(gender) = &query.gender {
        shoe_query = shoe_query.filter(shoes::gender.like(gender.trim().to_string()));
    }
    if let Some(sport) = &query.sport {
        shoe_query = shoe_query.filter(shoes::sport.like(sport.trim().to_string()));
    }
    if let Some(brand) = &query.brand {
        shoe_query = shoe_query.filter(shoes::brand.like(brand.trim().to_string()));
    }
    if !query.size.is_empty() {
        shoe_query = shoe_query.filter(shoes::size.eq_any(query.size.clone()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        shoe_query = shoe_query.filter(
            shoes::name
                .like(pattern.clone())
                .or(shoes::brand.like(pattern.clone()))
                .or(shoes::description.like(pattern)),
        );
    }

    let result = shoe_query
        .order(shoes::display_id.asc())
        .load::<Shoe>(conn)?;

    info!("Retrieved {} shoes", result.len());

    Ok(result)
}

/// Edits an inventory item
///
/// Only the fields present in `update` change. When `hidden` is given the
/// item is hidden or made visible again; otherwise a visible item's status
/// follows its quantity.
///
/// ### Errors
///
/// Returns `RepoError::NotFound` if the item does not exist and
/// `RepoError::Validation` for empty text or a negative quantity.
#[instrument(skip(pool, update), fields(shoe_id = %shoe_id))]
pub async fn update_shoe(pool: &DbPool, shoe_id: &str, update: UpdateShoeDto) -> Result<Shoe> {
    debug!("Updating shoe");

    for (field, value) in [
        ("Name", &update.name),
        ("Brand", &update.brand),
        ("Gender", &update.gender),
        ("Size", &update.size),
        ("Sport", &update.sport),
        ("Condition", &update.condition),
    ] {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    if let Some(quantity) = update.quantity {
        validate_quantity(quantity)?;
    }

    let conn = &mut pool.get()?;

    // Status is derived from the stored quantity, so read and write under one lock
    let shoe = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let existing = shoes::table
            .find(shoe_id)
            .first::<Shoe>(conn)
            .optional()?
            .ok_or_else(|| RepoError::NotFound(format!("Shoe {}", shoe_id)))?;

        let quantity = update.quantity.unwrap_or(existing.get_quantity());
        let status = match update.hidden {
            Some(true) => ShoeStatus::Hidden,
            Some(false) => ShoeStatus::for_quantity(quantity),
            None => existing.get_status().after_stock_change(quantity),
        };

        let changes = ShoeChangeset {
            name: update.name,
            brand: update.brand,
            gender: update.gender,
            size: update.size,
            sport: update.sport,
            condition: update.condition,
            description: update.description,
            image_key: update.image_key,
            quantity: update.quantity,
            status: Some(status),
            updated_at: Utc::now().naive_utc(),
        };

        diesel::update(shoes::table.find(shoe_id)).set(changes).execute(conn)?;
        Ok(shoes::table.find(shoe_id).first::<Shoe>(conn)?)
    })?;

    info!("Updated shoe #{} (status {})", shoe.get_display_id(), shoe.get_status());

    Ok(shoe)
}

/// Removes an inventory item
///
/// ### Errors
///
/// Returns `RepoError::Conflict` if any order references the item (hide it
/// instead) and `RepoError::NotFound` if it does not exist.
#[instrument(skip(pool), fields(shoe_id = %shoe_id))]
pub async fn delete_shoe(pool: &DbPool, shoe_id: &str) -> Result<()> {
    debug!("Deleting shoe");

    let conn = &mut pool.get()?;

    let referenced: i64 = order_items::table
        .filter(order_items::shoe_id.eq(shoe_id))
        .count()
        .get_result(conn)?;
    if referenced > 0 {
        warn!("Shoe is part of {} orders", referenced);
        return Err(RepoError::Conflict(
            "Shoe is part of existing orders; hide it instead".to_string(),
        )
        .into());
    }

    let rows = diesel::delete(shoes::table.find(shoe_id))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Shoe {}", shoe_id)).into());
    }

    info!("Deleted shoe {}", shoe_id);

    Ok(())
}

/// Takes `quantity` pairs of a shoe out of stock inside a caller's transaction
///
/// ### Errors
///
/// Returns `RepoError::NotFound` for an unknown shoe and
/// `RepoError::InsufficientStock` when the item cannot be requested or
/// has fewer pairs than asked for.
pub(crate) fn reserve_stock(conn: &mut SqliteConnection, shoe_id: &str, quantity: i32) -> Result<Shoe> {
    let shoe = shoes::table
        .find(shoe_id)
        .first::<Shoe>(conn)
        .optional()?
        .ok_or_else(|| RepoError::NotFound(format!("Shoe {}", shoe_id)))?;

    let available = if shoe.is_requestable() { shoe.get_quantity() } else { 0 };
    if available < quantity {
        return Err(RepoError::InsufficientStock {
            shoe_id: shoe_id.to_string(),
            requested: quantity,
            available,
        }
        .into());
    }

    set_stock(conn, &shoe, shoe.get_quantity() - quantity)?;
    debug!("Reserved {} of shoe #{}", quantity, shoe.get_display_id());

    Ok(shoe)
}

/// Puts `quantity` pairs of a shoe back into stock inside a caller's transaction
pub(crate) fn release_stock(conn: &mut SqliteConnection, shoe_id: &str, quantity: i32) -> Result<()> {
    let shoe = shoes::table
        .find(shoe_id)
        .first::<Shoe>(conn)
        .optional()?
        .ok_or_else(|| RepoError::NotFound(format!("Shoe {}", shoe_id)))?;

    set_stock(conn, &shoe, shoe.get_quantity() + quantity)?;
    debug!("Released {} of shoe #{}", quantity, shoe.get_display_id());

    Ok(())
}

fn set_stock(conn: &mut SqliteConnection, shoe: &Shoe, quantity: i32) -> QueryResult<usize> {
    diesel::update(shoes::table.find(shoe.get_id()))
        .set((
            shoes::quantity.eq(quantity),
            shoes::status.eq(shoe.get_status().after_stock_change(quantity)),
            shoes::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
}
