use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{CreateVolunteerDto, VolunteerQueryDto};
use crate::models::{Volunteer, VolunteerContact, VolunteerStatus};
use crate::schema::volunteers;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::{require_email, require_text, RepoError};

/// Records a volunteer sign-up
///
/// ### Errors
///
/// Returns `RepoError::Validation` if a name is empty or the email is invalid.
#[instrument(skip(pool, dto))]
pub async fn create_volunteer(pool: &DbPool, dto: CreateVolunteerDto) -> Result<Volunteer> {
    debug!("Creating volunteer");

    require_text("First name", &dto.first_name)?;
    require_text("Last name", &dto.last_name)?;
    require_email(&dto.email)?;

    let conn = &mut pool.get()?;

    let contact = VolunteerContact {
        first_name: dto.first_name.trim().to_string(),
        last_name: dto.last_name.trim().to_string(),
        email: dto.email,
        phone: dto.phone,
        city: dto.city,
        state: dto.state,
    };
    let volunteer = Volunteer::new(contact, &dto.interests, dto.availability, dto.message);

    diesel::insert_into(volunteers::table)
        .values(volunteer.clone())
        .execute_with_retry(conn)
        .await?;

    info!("Created volunteer with id: {}", volunteer.get_id());

    Ok(volunteer)
}

/// Retrieves a volunteer by ID
#[instrument(skip(pool), fields(volunteer_id = %volunteer_id))]
pub fn get_volunteer(pool: &DbPool, volunteer_id: &str) -> Result<Option<Volunteer>> {
    let conn = &mut pool.get()?;

    let result = volunteers::table
        .find(volunteer_id)
        .first::<Volunteer>(conn)
        .optional()?;

    Ok(result)
}

/// Lists volunteers, newest first
#[instrument(skip(pool, query))]
pub fn list_volunteers(pool: &DbPool, query: &VolunteerQueryDto) -> Result<Vec<Volunteer>> {
    debug!("Listing volunteers with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let mut volunteer_query = volunteers::table.into_boxed();
    if let Some(status) = query.status {
        volunteer_query = volunteer_query.filter(volunteers::status.eq(status));
    }

    let result = volunteer_query
        .order(volunteers::created_at.desc())
        .load::<Volunteer>(conn)?;

    info!("Retrieved {} volunteers", result.len());

    Ok(result)
}

/// Sets a volunteer's status; any status may follow any other
#[instrument(skip(pool), fields(volunteer_id = %volunteer_id, status = %status))]
pub async fn update_volunteer_status(pool: &DbPool, volunteer_id: &str, status: VolunteerStatus) -> Result<Volunteer> {
    debug!("Updating volunteer status");

    let conn = &mut pool.get()?;

    let rows = diesel::update(volunteers::table.find(volunteer_id))
        .set((volunteers::status.eq(status), volunteers::updated_at.eq(Utc::now().naive_utc())))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Volunteer {}", volunteer_id)).into());
    }

    Ok(volunteers::table.find(volunteer_id).first::<Volunteer>(conn)?)
}

/// Deletes a volunteer sign-up
#[instrument(skip(pool), fields(volunteer_id = %volunteer_id))]
pub async fn delete_volunteer(pool: &DbPool, volunteer_id: &str) -> Result<()> {
    debug!("Deleting volunteer");

    let conn = &mut pool.get()?;

    let rows = diesel::delete(volunteers::table.find(volunteer_id))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Volunteer {}", volunteer_id)).into());
    }

    info!("Deleted volunteer {}", volunteer_id);

    Ok(())
}
