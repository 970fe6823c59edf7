use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, TokenKind, UserParams, users};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn params() -> UserParams {
    UserParams::new(
        "Test Name",
        "test_email@email.com",
        "best_password",
        "best_password",
    )
}

fn validation_fields(err: EngineError) -> Vec<String> {
    match err {
        EngineError::Validation(errors) => errors.fields().keys().cloned().collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_be_valid() {
    let (engine, _db) = engine_with_db().await;
    engine.validate_user(&params()).await.unwrap();
}

#[tokio::test]
async fn email_addresses_should_be_unique() {
    let (engine, _db) = engine_with_db().await;
    engine.create_user(&params()).await.unwrap();

    let mut duplicate = params();
    duplicate.email = duplicate.email.map(|e| e.to_uppercase());
    let err = engine.validate_user(&duplicate).await.unwrap_err();
    assert_eq!(validation_fields(err), vec!["email".to_string()]);

    let err = engine.create_user(&duplicate).await.unwrap_err();
    match err {
        EngineError::Validation(errors) => {
            assert_eq!(errors.get("email"), ["has already been taken"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(engine.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn email_addresses_should_be_saved_as_lower_case() {
    let (engine, _db) = engine_with_db().await;
    let mut p = params();
    p.email = Some("Foo@ExAMPle.CoM".to_string());
    let user = engine.create_user(&p).await.unwrap();

    let reloaded = engine.user(user.id).await.unwrap();
    assert_eq!(reloaded.email, "foo@example.com");
}

#[tokio::test]
async fn invalid_user_is_not_saved() {
    let (engine, _db) = engine_with_db().await;
    let mut p = params();
    p.name = Some("a".repeat(51));
    p.password = Some(" ".repeat(6));
    p.password_confirmation = Some(" ".repeat(6));

    let err = engine.create_user(&p).await.unwrap_err();
    assert_eq!(
        validation_fields(err),
        vec!["name".to_string(), "password".to_string()]
    );
    assert_eq!(engine.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn password_is_stored_as_digest() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    assert_ne!(user.password_digest, "best_password");
    assert!(user.authenticated(TokenKind::Password, "best_password"));
    assert!(!user.admin);
}

#[tokio::test]
async fn authenticated_should_return_false_for_a_user_with_nil_digest() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    assert!(user.remember_digest.is_none());
    assert!(!user.authenticated(TokenKind::Remember, ""));
}

#[tokio::test]
async fn update_changes_only_supplied_attributes() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();

    let changes = UserParams {
        name: Some("Renamed".to_string()),
        email: Some("  NEW@Example.com ".to_string()),
        password: Some(String::new()),
        password_confirmation: Some(String::new()),
    };
    let updated = engine.update_user(user.id, &changes).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.email, "new@example.com");
    assert_eq!(updated.password_digest, user.password_digest);
}

#[tokio::test]
async fn update_keeps_own_email_but_rejects_anothers() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    engine
        .create_user(&UserParams::new(
            "Other",
            "other@example.com",
            "password",
            "password",
        ))
        .await
        .unwrap();

    let same = UserParams {
        email: Some("TEST_EMAIL@email.com".to_string()),
        ..Default::default()
    };
    engine.update_user(user.id, &same).await.unwrap();

    let taken = UserParams {
        email: Some("Other@Example.com".to_string()),
        ..Default::default()
    };
    let err = engine.update_user(user.id, &taken).await.unwrap_err();
    assert_eq!(validation_fields(err), vec!["email".to_string()]);
}

#[tokio::test]
async fn update_with_short_password_fails() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    let changes = UserParams {
        password: Some("foo".to_string()),
        password_confirmation: Some("bar".to_string()),
        ..Default::default()
    };
    let err = engine.update_user(user.id, &changes).await.unwrap_err();
    assert_eq!(
        validation_fields(err),
        vec!["password".to_string(), "password_confirmation".to_string()]
    );
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.user(42).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.destroy_user(42).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn index_is_paginated_by_id() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .per_page(2)
        .build()
        .await
        .unwrap();

    for n in 0..5 {
        engine
            .create_user(&UserParams::new(
                &format!("User {n}"),
                &format!("user-{n}@example.com"),
                "password",
                "password",
            ))
            .await
            .unwrap();
    }

    let first = engine.users(None).await.unwrap();
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items.len(), 2);
    let last = engine.users(Some(3)).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].name, "User 4");
    assert!(first.items[0].id < first.items[1].id);
}

#[tokio::test]
async fn set_admin_promotes() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    let user: users::Model = engine.set_admin(user.id, true).await.unwrap();
    assert!(user.admin);
}

#[tokio::test]
async fn pages_past_the_end_are_empty() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user(&params()).await.unwrap();
    engine.create_micropost(user.id, "Lorem ipsum").await.unwrap();

    let users = engine.users(Some(u64::MAX)).await.unwrap();
    assert!(users.items.is_empty());
    assert_eq!((users.page, users.total_pages), (u64::MAX, 1));

    assert!(engine.users(Some(2)).await.unwrap().items.is_empty());
    assert!(
        engine
            .microposts_for(user.id, Some(u64::MAX))
            .await
            .unwrap()
            .items
            .is_empty()
    );
    assert!(engine.feed(user.id, Some(u64::MAX)).await.unwrap().items.is_empty());
    assert!(
        engine
            .followers(user.id, Some(u64::MAX))
            .await
            .unwrap()
            .items
            .is_empty()
    );
}
