use super::*;
use crate::repo::tests::setup_test_db;
use crate::test_utils::arb_json;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever JSON is stored under a key comes back unchanged
    #[test]
    fn prop_upsert_get_preserves_value(key in "[a-z0-9_.-]{1,64}", value in arb_json()) {
        let pool = setup_test_db();

        upsert_setting(&pool, &key, value.clone()).unwrap();
        let stored = get_setting(&pool, &key).unwrap().unwrap();

        prop_assert_eq!(stored.get_value(), &value);
    }

    /// Keys with characters outside the slug alphabet are always rejected
    #[test]
    fn prop_invalid_keys_rejected(prefix in "[a-z]{0,5}", bad in "[A-Z /\\\\:]", suffix in "[a-z]{0,5}") {
        let pool = setup_test_db();
        let key = format!("{}{}{}", prefix, bad, suffix);

        prop_assert!(upsert_setting(&pool, &key, serde_json::json!(true)).is_err());
        prop_assert!(list_settings(&pool).unwrap().is_empty());
    }
}
