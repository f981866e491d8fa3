use super::*;
use crate::dto::CreateDonationDto;
use crate::models::{Role, ShoeDetails};
use crate::repo::tests::setup_test_db;
use crate::repo::{create_donation, create_shoe, create_user, enqueue_email, transition_donation};

fn details(name: &str) -> ShoeDetails {
    ShoeDetails {
        name: name.to_string(),
        brand: "Asics".to_string(),
        gender: "Women".to_string(),
        size: "7".to_string(),
        sport: "Tennis".to_string(),
        condition: "Good".to_string(),
        description: None,
        image_key: None,
    }
}

fn money(amount_cents: i64) -> CreateDonationDto {
    CreateDonationDto {
        donor_name: "Sam".to_string(),
        donor_email: "sam@example.org".to_string(),
        kind: DonationKind::Money,
        shoe_count: None,
        shoe_description: None,
        amount_cents: Some(amount_cents),
        payment_reference: None,
        message: None,
    }
}

fn count_of<S: PartialEq>(counts: &[(S, i64)], status: S) -> i64 {
    counts.iter().find(|(s, _)| *s == status).map(|(_, n)| *n).unwrap()
}

#[tokio::test]
async fn test_dashboard_stats_empty() {
    let pool = setup_test_db();

    let stats = dashboard_stats(&pool).unwrap();

    assert_eq!(stats.donations_by_status.len(), DonationStatus::ALL.len());
    assert!(stats.donations_by_status.iter().all(|(_, n)| *n == 0));
    assert_eq!(stats.pairs_available, 0);
    assert_eq!(stats.money_raised_cents, 0);
    assert_eq!(stats.users, 0);
}

#[tokio::test]
async fn test_dashboard_stats_counts() {
    let pool = setup_test_db();

    create_user(&pool, "admin@example.org", "Admin", "correct horse", Role::Admin).await.unwrap();
    create_shoe(&pool, details("Gel"), 3, false, None).unwrap();
    create_shoe(&pool, details("Court"), 2, false, None).unwrap();
    create_shoe(&pool, details("Empty"), 0, false, None).unwrap();
    create_shoe(&pool, details("Hidden"), 4, true, None).unwrap();

    create_donation(&pool, None, money(1500)).await.unwrap();
    let cancelled = create_donation(&pool, None, money(9900)).await.unwrap();
    transition_donation(&pool, &cancelled.get_id(), DonationStatus::Cancelled, None).unwrap();

    enqueue_email(&pool, "sam@example.org", "Thanks", "Body").await.unwrap();

    let stats = dashboard_stats(&pool).unwrap();

    assert_eq!(count_of(&stats.shoes_by_status, ShoeStatus::Available), 2);
    assert_eq!(count_of(&stats.shoes_by_status, ShoeStatus::OutOfStock), 1);
    assert_eq!(count_of(&stats.shoes_by_status, ShoeStatus::Hidden), 1);
    assert_eq!(stats.pairs_available, 5);

    assert_eq!(count_of(&stats.donations_by_status, DonationStatus::Submitted), 1);
    assert_eq!(count_of(&stats.donations_by_status, DonationStatus::Cancelled), 1);
    assert_eq!(stats.money_raised_cents, 1500);

    assert_eq!(stats.users, 1);
    assert_eq!(stats.pending_emails, 1);
    assert_eq!(count_of(&stats.orders_by_status, OrderStatus::Pending), 0);
}

#[tokio::test]
async fn test_dashboard_stats_merges_legacy_spellings() {
    let pool = setup_test_db();

    let gel = create_shoe(&pool, details("Gel"), 3, false, None).unwrap();
    let court = create_shoe(&pool, details("Court"), 2, false, None).unwrap();
    create_shoe(&pool, details("Empty"), 0, false, None).unwrap();

    let current = create_donation(&pool, None, money(1500)).await.unwrap();
    let legacy = create_donation(&pool, None, money(2500)).await.unwrap();
    let legacy_cancelled = create_donation(&pool, None, money(9900)).await.unwrap();

    {
        let conn = &mut pool.get().unwrap();
        diesel::update(shoes::table.find(gel.get_id()))
            .set(shoes::status.eq("Available"))
            .execute(conn)
            .unwrap();
        diesel::update(shoes::table.find(court.get_id()))
            .set(shoes::status.eq("available"))
            .execute(conn)
            .unwrap();
        diesel::update(donations::table.find(legacy.get_id()))
            .set((donations::status.eq("pending"), donations::kind.eq("monetary")))
            .execute(conn)
            .unwrap();
        diesel::update(donations::table.find(legacy_cancelled.get_id()))
            .set(donations::status.eq("canceled"))
            .execute(conn)
            .unwrap();
    }

    let stats = dashboard_stats(&pool).unwrap();

    assert_eq!(count_of(&stats.shoes_by_status, ShoeStatus::Available), 2);
    assert_eq!(count_of(&stats.shoes_by_status, ShoeStatus::OutOfStock), 1);
    assert_eq!(stats.pairs_available, 5);

    // "submitted" and "pending" are the same status
    assert_eq!(count_of(&stats.donations_by_status, DonationStatus::Submitted), 2);
    assert_eq!(count_of(&stats.donations_by_status, DonationStatus::Cancelled), 1);
    assert_eq!(stats.money_raised_cents, 1500 + 2500);
    assert_eq!(current.get_status(), DonationStatus::Submitted);
}
