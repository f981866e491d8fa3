use crate::db::DbPool;
use crate::dto::DashboardStatsDto;
use crate::models::{DonationKind, DonationStatus, EmailStatus, OrderStatus, ShoeStatus, VolunteerStatus};
use crate::schema::{donations, emails, orders, shoes, users, volunteers};
use diesel::dsl::count_star;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug};

/// Orders grouped counts by the declaration order of the status enum,
/// filling in zero for statuses with no rows
///
/// Rows are grouped on the stored text, so a legacy spelling arrives as its
/// own group; groups that parse to the same status are added together.
fn complete<S: Copy + PartialEq>(all: &[S], counts: Vec<(S, i64)>) -> Vec<(S, i64)> {
    all.iter()
        .map(|status| {
            let count = counts
                .iter()
                .filter(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .sum();
            (*status, count)
        })
        .collect()
}

/// Gathers the counts shown on the admin dashboard
#[instrument(skip(pool))]
pub fn dashboard_stats(pool: &DbPool) -> Result<DashboardStatsDto> {
    debug!("Computing dashboard stats");

    let conn = &mut pool.get()?;

    let donations_by_status = donations::table
        .group_by(donations::status)
        .select((donations::status, count_star()))
        .load::<(DonationStatus, i64)>(conn)?;

    let shoes_by_status = shoes::table
        .group_by(shoes::status)
        .select((shoes::status, count_star()))
        .load::<(ShoeStatus, i64)>(conn)?;

    let orders_by_status = orders::table
        .group_by(orders::status)
        .select((orders::status, count_star()))
        .load::<(OrderStatus, i64)>(conn)?;

    let volunteers_by_status = volunteers::table
        .group_by(volunteers::status)
        .select((volunteers::status, count_star()))
        .load::<(VolunteerStatus, i64)>(conn)?;

    // Filtered after parsing so legacy spellings are counted too
    let pairs_available: i64 = shoes::table
        .select((shoes::status, shoes::quantity))
        .load::<(ShoeStatus, i32)>(conn)?
        .into_iter()
        .filter(|(status, _)| *status == ShoeStatus::Available)
        .map(|(_, quantity)| i64::from(quantity))
        .sum();

    let money_raised_cents: i64 = donations::table
        .filter(donations::amount_cents.is_not_null())
        .select((donations::kind, donations::status, donations::amount_cents))
        .load::<(DonationKind, DonationStatus, Option<i64>)>(conn)?
        .into_iter()
        .filter(|(kind, status, _)| *kind == DonationKind::Money && *status != DonationStatus::Cancelled)
        .filter_map(|(_, _, amount_cents)| amount_cents)
        .sum();

    let users: i64 = users::table.count().get_result(conn)?;

    let pending_emails: i64 = emails::table
        .filter(emails::status.eq(EmailStatus::Pending))
        .count()
        .get_result(conn)?;

    Ok(DashboardStatsDto {
        donations_by_status: complete(DonationStatus::ALL, donations_by_status),
        shoes_by_status: complete(ShoeStatus::ALL, shoes_by_status),
        pairs_available,
        orders_by_status: complete(OrderStatus::ALL, orders_by_status),
        volunteers_by_status: complete(VolunteerStatus::ALL, volunteers_by_status),
        money_raised_cents,
        users,
        pending_emails,
    })
}

#[cfg(test)]
mod tests;
