use crate::db::{is_unique_violation, DbPool, ExecuteWithRetry};
use crate::dto::{CreateDonationDto, DonationQueryDto};
use crate::models::{normalize_email, Donation, DonationContent, DonationKind, DonationStatus};
use crate::reference::{generate_reference, ReferenceKind, MAX_REFERENCE_ATTEMPTS};
use crate::schema::donations;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::{Result, anyhow};
use tracing::{instrument, debug, info, warn};

use super::{require_email, require_text, RepoError};

fn donation_content(dto: &CreateDonationDto) -> Result<DonationContent, RepoError> {
    match dto.kind {
        DonationKind::Shoes => match dto.shoe_count {
            Some(count) if count > 0 => Ok(DonationContent::Shoes {
                count,
                description: dto.shoe_description.clone(),
            }),
            _ => Err(RepoError::Validation(
                "Shoe donations need a pair count of at least 1".to_string(),
            )),
        },
        DonationKind::Money => match dto.amount_cents {
            Some(amount_cents) if amount_cents > 0 => Ok(DonationContent::Money {
                amount_cents,
                payment_reference: dto.payment_reference.clone(),
            }),
            _ => Err(RepoError::Validation(
                "Money donations need a positive amount".to_string(),
            )),
        },
    }
}

/// Records a new donation with a fresh reference ID
///
/// A reference that collides with an existing one is replaced and the
/// insert retried, up to `MAX_REFERENCE_ATTEMPTS` times.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `donor_id` - The signed-in account submitting the donation, if any
/// * `dto` - The submitted donation form
///
/// ### Errors
///
/// Returns an error if:
/// - The donor details or the kind-specific fields are invalid (`RepoError::Validation`)
/// - No unique reference could be generated
/// - The database insert operation fails
#[instrument(skip(pool, dto), fields(kind = %dto.kind))]
pub async fn create_donation(pool: &DbPool, donor_id: Option<String>, dto: CreateDonationDto) -> Result<Donation> {
    debug!("Creating new donation");

    require_text("Donor name", &dto.donor_name)?;
    require_email(&dto.donor_email)?;
    let content = donation_content(&dto)?;

    let donor_name = dto.donor_name.trim().to_string();
    let donor_email = normalize_email(&dto.donor_email);
    let build = |reference_id| {
        Donation::new(
            reference_id,
            donor_id.clone(),
            donor_name.clone(),
            donor_email.clone(),
            content.clone(),
            dto.message.clone(),
        )
    };

    insert_with_fresh_reference(pool, || generate_reference(ReferenceKind::Donation), build).await
}

/// Inserts the donation `build` makes for the first reference from
/// `next_reference` that is not already taken
async fn insert_with_fresh_reference(
    pool: &DbPool,
    mut next_reference: impl FnMut() -> String,
    build: impl Fn(String) -> Donation,
) -> Result<Donation> {
    let conn = &mut pool.get()?;

    for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
        let donation = build(next_reference());

        let inserted = diesel::insert_into(donations::table)
            .values(donation.clone())
            .execute_with_retry(conn)
            .await
            .map_err(anyhow::Error::from);

        match inserted {
            Ok(_) => {
                info!("Created donation {} with id: {}", donation.get_reference_id(), donation.get_id());
                return Ok(donation);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Reference collision on attempt {}, retrying", attempt);
            }
            Err(e) => return Err(e),
        }
    }

    Err(anyhow!("Could not generate a unique donation reference"))
}

/// Retrieves a donation by ID
#[instrument(skip(pool), fields(donation_id = %donation_id))]
pub fn get_donation(pool: &DbPool, donation_id: &str) -> Result<Option<Donation>> {
    debug!("Retrieving donation by id");

    let conn = &mut pool.get()?;

    let result = donations::table
        .find(donation_id)
        .first::<Donation>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves a donation by its reference ID, ignoring case
#[instrument(skip(pool), fields(reference_id = %reference_id))]
pub fn get_donation_by_reference(pool: &DbPool, reference_id: &str) -> Result<Option<Donation>> {
    debug!("Retrieving donation by reference");

    let conn = &mut pool.get()?;

    let result = donations::table
        .filter(donations::reference_id.eq(reference_id.trim().to_uppercase()))
        .first::<Donation>(conn)
        .optional()?;

    Ok(result)
}

/// Lists donations matching the query, newest first
#[instrument(skip(pool, query))]
pub fn list_donations(pool: &DbPool, query: &DonationQueryDto) -> Result<Vec<Donation>> {
    debug!("Listing donations with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let mut donation_query = donations::table.into_boxed();

    if let Some(status) = query.status {
        donation_query = donation_query.filter(donations::status.eq(status));
    }
    if let Some(kind) = query.kind {
        donation_query = donation_query.filter(donations::kind.eq(kind));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        donation_query = donation_query.filter(
            donations::donor_name
                .like(pattern.clone())
                .or(donations::donor_email.like(pattern.clone()))
                .or(donations::reference_id.like(pattern)),
        );
    }

    let result = donation_query
        .order(donations::created_at.desc())
        .load::<Donation>(conn)?;

    info!("Retrieved {} donations", result.len());

    Ok(result)
}

/// Lists the donations made while signed in to an account, newest first
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn list_donations_for_donor(pool: &DbPool, user_id: &str) -> Result<Vec<Donation>> {
    debug!("Listing donations for donor");

    let conn = &mut pool.get()?;

    let result = donations::table
        .filter(donations::donor_id.eq(user_id))
        .order(donations::created_at.desc())
        .load::<Donation>(conn)?;

    Ok(result)
}

/// Moves a donation to a new status and records it in the history
///
/// ### Errors
///
/// Returns `RepoError::NotFound` if the donation does not exist and
/// `RepoError::InvalidTransition` if the lifecycle does not allow the move.
#[instrument(skip(pool, note), fields(donation_id = %donation_id, next = %next))]
pub fn transition_donation(
    pool: &DbPool,
    donation_id: &str,
    next: DonationStatus,
    note: Option<String>,
) -> Result<Donation> {
    debug!("Transitioning donation");

    let conn = &mut pool.get()?;

    let donation = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let donation = donations::table
            .find(donation_id)
            .first::<Donation>(conn)
            .optional()?
            .ok_or_else(|| RepoError::NotFound(format!("Donation {}", donation_id)))?;

        let current = donation.get_status();
        if !current.can_transition_to(next) {
            return Err(RepoError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let mut history = donation.get_status_history().clone();
        history.push(next, now, note);

        diesel::update(donations::table.find(donation_id))
            .set((
                donations::status.eq(next),
                donations::status_history.eq(history),
                donations::updated_at.eq(now.naive_utc()),
            ))
            .execute(conn)?;

        Ok(donations::table.find(donation_id).first::<Donation>(conn)?)
    })?;

    info!("Donation {} is now {}", donation.get_reference_id(), next);

    Ok(donation)
}

/// Deletes a donation; inventory items that came from it are kept
#[instrument(skip(pool), fields(donation_id = %donation_id))]
pub async fn delete_donation(pool: &DbPool, donation_id: &str) -> Result<()> {
    debug!("Deleting donation");

    let conn = &mut pool.get()?;

    let rows = diesel::delete(donations::table.find(donation_id))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Donation {}", donation_id)).into());
    }

    info!("Deleted donation {}", donation_id);

    Ok(())
}
