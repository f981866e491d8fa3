use std::sync::Arc;

use crate::config::base_config;
use crate::models::{ShippingAddress, ShoeDetails};
use crate::notify::Mailer;
use crate::repo::tests::setup_test_db;
use crate::storage::LocalStorage;
use crate::AppState;
use proptest::prelude::*;
use diesel::sql_types::Text;
use diesel::{QueryableByName, RunQueryDsl};
use serde_json::{Number, Value};

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Checks that the migrations create every table the schema declares
#[tokio::test]
async fn test_migrations_create_tables() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "sessions", "password_resets", "donations", "shoes", "orders",
        "order_items", "volunteers", "settings", "uploads", "emails",
        "__diesel_schema_migrations",
    ];

    for table in expected_tables {
        assert!(
            table_names.iter().any(|t| t.name == table),
            "Table '{}' not found in database",
            table
        );

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }
}

/// Builds application state over a fresh test database
///
/// Email is log-only and uploads go to a unique directory under the system
/// temp dir.
pub fn test_state() -> Arc<AppState> {
    let pool = setup_test_db();
    let upload_dir = std::env::temp_dir().join(format!("newsteps-test-{}", uuid::Uuid::new_v4()));
    let mut config = base_config(None);
    config.upload_dir = upload_dir.clone();
    config.admin_email = Some("admin-inbox@example.org".to_string());

    Arc::new(AppState {
        pool: (*pool).clone(),
        storage: LocalStorage::new(upload_dir, config.max_upload_bytes),
        mailer: Mailer::log_only(),
        config,
    })
}

/// Generates a non-blank single-line string
pub fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .'-]{0,30}"
}

/// Generates plausible shoe details
pub fn arb_shoe_details() -> impl Strategy<Value = ShoeDetails> {
    (
        arb_text(),
        prop::sample::select(vec!["Nike", "Adidas", "Asics", "New Balance", "Brooks"]),
        prop::sample::select(vec!["Men", "Women", "Unisex", "Kids"]),
        prop::sample::select(vec!["5", "6.5", "8", "9", "10", "11.5", "12"]),
        prop::sample::select(vec!["Running", "Soccer", "Basketball", "Tennis"]),
        prop::option::of(arb_text()),
    )
        .prop_map(|(name, brand, gender, size, sport, description)| ShoeDetails {
            name,
            brand: brand.to_string(),
            gender: gender.to_string(),
            size: size.to_string(),
            sport: sport.to_string(),
            condition: "Good".to_string(),
            description,
            image_key: None,
        })
}

/// Generates a complete shipping address
pub fn arb_shipping_address() -> impl Strategy<Value = ShippingAddress> {
    (arb_text(), arb_text(), prop::option::of(arb_text()), arb_text(), "[A-Z]{2}", "[0-9]{5}")
        .prop_map(|(name, address_line1, address_line2, city, state, postal_code)| ShippingAddress {
            name,
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country: "US".to_string(),
            phone: None,
        })
}

/// One step in a randomized inventory workload
#[derive(Debug, Clone)]
pub enum OrderStep {
    /// Place an order for `quantity` pairs of the shoe at this index
    Place { shoe: usize, quantity: i32 },
    /// Cancel the n-th placed order (modulo the number placed)
    Cancel { order: usize },
    /// Move the n-th placed order one step forward
    Advance { order: usize },
}

/// Generates a workload step over `shoes` inventory items
pub fn arb_order_step(shoes: usize) -> impl Strategy<Value = OrderStep> {
    prop_oneof![
        3 => (0..shoes, 1i32..=3).prop_map(|(shoe, quantity)| OrderStep::Place { shoe, quantity }),
        1 => any::<usize>().prop_map(|order| OrderStep::Cancel { order }),
        1 => any::<usize>().prop_map(|order| OrderStep::Advance { order }),
    ]
}

/// Generates arbitrary JSON whose numbers survive a text round trip exactly
pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(Number::from(n))),
        ".*".prop_map(Value::String)
    ];

    leaf.prop_recursive(
        4,  // levels deep
        64, // maximum nodes
        8,  // items per collection
        |inner| prop_oneof![
            prop::collection::vec(inner.clone(), 0..8)
                .prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,12}", inner, 0..8)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ])
}
