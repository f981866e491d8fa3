use super::*;
use crate::repo::tests::setup_test_db;

#[tokio::test]
async fn test_create_user() {
    let pool = setup_test_db();

    let user = create_user(&pool, " Dana@Example.org ", "Dana", "correct horse", Role::User).await.unwrap();

    assert_eq!(user.get_email(), "dana@example.org");
    assert_eq!(user.get_name(), "Dana");
    assert_eq!(user.get_role(), Role::User);
    assert_ne!(user.get_password_hash(), "correct horse");

    let fetched = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let pool = setup_test_db();

    create_user(&pool, "dana@example.org", "Dana", "correct horse", Role::User).await.unwrap();
    let err = create_user(&pool, "DANA@example.org", "Other", "battery staple", Role::User).await.unwrap_err();

    assert!(matches!(err.downcast_ref::<RepoError>(), Some(RepoError::Conflict(_))));
}

#[tokio::test]
async fn test_create_user_validates_input() {
    let pool = setup_test_db();

    for (email, name, password) in [
        ("not-an-email", "Dana", "correct horse"),
        ("dana@example.org", "  ", "correct horse"),
        ("dana@example.org", "Dana", "short"),
    ] {
        let err = create_user(&pool, email, name, password, Role::User).await.unwrap_err();
        assert!(
            matches!(err.downcast_ref::<RepoError>(), Some(RepoError::Validation(_))),
            "{} / {} / {} accepted",
            email, name, password
        );
    }

    assert!(list_users(&pool).unwrap().is_empty());
}

#[tokio::test]
async fn test_authenticate() {
    let pool = setup_test_db();
    let user = create_user(&pool, "dana@example.org", "Dana", "correct horse", Role::User).await.unwrap();

    let found = authenticate(&pool, "DANA@example.org", "correct horse").await.unwrap();
    assert_eq!(found.map(|u| u.get_id()), Some(user.get_id()));

    assert!(authenticate(&pool, "dana@example.org", "wrong password").await.unwrap().is_none());
    assert!(authenticate(&pool, "nobody@example.org", "correct horse").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_user_role() {
    let pool = setup_test_db();
    let user = create_user(&pool, "dana@example.org", "Dana", "correct horse", Role::User).await.unwrap();

    let updated = update_user_role(&pool, &user.get_id(), Role::Admin).await.unwrap();
    assert!(updated.is_admin());

    let err = update_user_role(&pool, "missing", Role::Admin).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<RepoError>(), Some(RepoError::NotFound(_))));
}

#[tokio::test]
async fn test_set_user_password() {
    let pool = setup_test_db();
    let user = create_user(&pool, "dana@example.org", "Dana", "correct horse", Role::User).await.unwrap();

    set_user_password(&pool, &user.get_id(), "battery staple").await.unwrap();

    assert!(authenticate(&pool, "dana@example.org", "correct horse").await.unwrap().is_none());
    assert!(authenticate(&pool, "dana@example.org", "battery staple").await.unwrap().is_some());

    assert!(set_user_password(&pool, &user.get_id(), "short").await.is_err());
}

#[tokio::test]
async fn test_ensure_admin() {
    let pool = setup_test_db();

    // Missing account without a password cannot be created
    assert!(ensure_admin(&pool, "admin@example.org", None).await.is_err());

    let admin = ensure_admin(&pool, "admin@example.org", Some("admin password")).await.unwrap();
    assert!(admin.is_admin());

    // Running again is a no-op
    let again = ensure_admin(&pool, "admin@example.org", None).await.unwrap();
    assert_eq!(again.get_id(), admin.get_id());

    // Existing users are promoted without touching their password
    create_user(&pool, "dana@example.org", "Dana", "correct horse", Role::User).await.unwrap();
    let promoted = ensure_admin(&pool, "dana@example.org", Some("ignored password")).await.unwrap();
    assert!(promoted.is_admin());
    assert!(authenticate(&pool, "dana@example.org", "correct horse").await.unwrap().is_some());
}
