//! PostgreSQL ストアの結合テスト
//!
//! `TEST_DATABASE_URL` が設定されている場合のみ実行される。

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;

use users_api::error::ErrorKind;
use users_api::models::User;
use users_api::repositories::{PgUserStore, UserStore};

async fn test_store() -> Option<PgUserStore> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB. Is Postgres running?");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(PgUserStore::new(pool))
}

/// テスト間で衝突しない接尾辞
fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", OffsetDateTime::now_utc().unix_timestamp_nanos())
}

fn new_user(email: &str, status: &str) -> User {
    User {
        first_name: "Pg".to_string(),
        last_name: "Tester".to_string(),
        email: email.to_string(),
        status: status.to_string(),
        ..User::default()
    }
}

#[tokio::test]
async fn insert_find_update_delete() {
    let Some(store) = test_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("crud"));

    let created = store.insert(new_user(&email, "active")).await.unwrap();
    assert!(created.id > 0);
    assert!(created.date_created.is_some());

    let fetched = store.find_by_id(created.id).await.unwrap();
    assert_eq!(fetched.email, email);

    let by_email = store.find_by_email(&email).await.unwrap();
    assert_eq!(by_email.id, created.id);

    let mut changed = fetched.clone();
    changed.first_name = "Changed".to_string();
    changed.status = "ignored".to_string();
    let updated = store.update(changed).await.unwrap();
    assert_eq!(updated.first_name, "Changed");
    assert_eq!(updated.status, "active");

    store.delete(created.id).await.unwrap();
    let error = store.find_by_id(created.id).await.unwrap_err();
    assert_eq!(error.error_kind, ErrorKind::NotFound);
    let error = store.delete(created.id).await.unwrap_err();
    assert_eq!(error.error_kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn duplicate_email_is_bad_request() {
    let Some(store) = test_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("dup"));

    store.insert(new_user(&email, "active")).await.unwrap();
    let error = store.insert(new_user(&email, "active")).await.unwrap_err();
    assert_eq!(error.error_kind, ErrorKind::BadRequest);
    assert_eq!(error.message, format!("email {email} already exists"));
}

#[tokio::test]
async fn find_by_status_is_ordered_or_not_found() {
    let Some(store) = test_store().await else {
        return;
    };
    let status = unique("status");

    let first = store
        .insert(new_user(&format!("{}@example.com", unique("s1")), &status))
        .await
        .unwrap();
    let second = store
        .insert(new_user(&format!("{}@example.com", unique("s2")), &status))
        .await
        .unwrap();

    let found = store.find_by_status(&status).await.unwrap();
    let ids: Vec<i64> = found.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let error = store
        .find_by_status(&unique("nobody"))
        .await
        .unwrap_err();
    assert_eq!(error.error_kind, ErrorKind::NotFound);
}
