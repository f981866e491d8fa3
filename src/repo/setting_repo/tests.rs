use super::*;
use crate::repo::tests::setup_test_db;
use serde_json::json;

#[tokio::test]
async fn test_upsert_and_get_setting() {
    let pool = setup_test_db();

    let timeline = json!([{"year": 2019, "text": "First shoe drive"}]);
    upsert_setting(&pool, "about_timeline", timeline.clone()).unwrap();

    let stored = get_setting(&pool, "about_timeline").unwrap().unwrap();
    assert_eq!(stored.get_value(), &timeline);

    let replaced = json!([{"year": 2019, "text": "First shoe drive"}, {"year": 2023, "text": "1,000 pairs"}]);
    upsert_setting(&pool, "about_timeline", replaced.clone()).unwrap();

    let stored = get_setting(&pool, "about_timeline").unwrap().unwrap();
    assert_eq!(stored.get_value(), &replaced);
    assert_eq!(list_settings(&pool).unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_settings_sorted() {
    let pool = setup_test_db();

    upsert_setting(&pool, "site.tagline", json!("Every step counts")).unwrap();
    upsert_setting(&pool, "about_timeline", json!([])).unwrap();
    upsert_setting(&pool, "max-orders", json!(2)).unwrap();

    let keys: Vec<String> = list_settings(&pool).unwrap().iter().map(|s| s.get_key()).collect();
    assert_eq!(keys, vec!["about_timeline", "max-orders", "site.tagline"]);
}

#[tokio::test]
async fn test_setting_key_validation() {
    let pool = setup_test_db();

    let too_long = "k".repeat(MAX_SETTING_KEY_LEN + 1);
    for bad in ["", "About", "../etc", "has space", too_long.as_str()] {
        let err = upsert_setting(&pool, bad, json!(1)).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<RepoError>(), Some(RepoError::Validation(_))),
            "{:?} accepted",
            bad
        );
    }
}

#[tokio::test]
async fn test_delete_setting() {
    let pool = setup_test_db();

    upsert_setting(&pool, "banner", json!({"text": "Spring drive"})).unwrap();
    delete_setting(&pool, "banner").await.unwrap();

    assert!(get_setting(&pool, "banner").unwrap().is_none());
    let err = delete_setting(&pool, "banner").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<RepoError>(), Some(RepoError::NotFound(_))));
}
