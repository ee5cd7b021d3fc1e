//! Database-backed repository tests.
//!
//! These exercise the SQL contracts that the unit tests cannot reach: the
//! COALESCE partial update, the reset-code upsert, and delete idempotence.
//! They need a reachable `PostgreSQL` instance, so they are ignored by
//! default; set `BAKEHOUSE_TEST_DATABASE_URL` (or `DATABASE_URL`) and run
//! with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use bakehouse_core::Email;
use bakehouse_storefront::db::otps::OtpRepository;
use bakehouse_storefront::db::users::UserRepository;
use bakehouse_storefront::models::otp::OtpRecord;

async fn test_pool() -> PgPool {
    let url = std::env::var("BAKEHOUSE_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set BAKEHOUSE_TEST_DATABASE_URL to run database tests");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");

    sqlx::migrate!().run(&pool).await.expect("run migrations");

    pool
}

/// Unique per-run identity so tests never collide with leftovers.
fn unique(tag: &str) -> String {
    format!("{tag}-{}", Utc::now().timestamp_nanos_opt().unwrap())
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn test_update_with_only_name_keeps_email_and_username() {
    let pool = test_pool().await;
    let repo = UserRepository::new(&pool);

    let handle = unique("crumb");
    let email = Email::parse(&format!("{handle}@bakehouse.test")).unwrap();
    let user = repo
        .create("Mira Crumb", &email, &handle, "not-a-real-hash")
        .await
        .unwrap();

    let updated = repo
        .update_profile(user.id, Some("Mira Renamed"), None, None)
        .await
        .unwrap();

    assert_eq!(updated.name, "Mira Renamed");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.username, user.username);

    repo.delete(user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn test_new_reset_request_replaces_prior_code() {
    let pool = test_pool().await;
    let repo = OtpRepository::new(&pool);

    let email = format!("{}@bakehouse.test", unique("reset"));
    let now = Utc::now();

    let first = OtpRecord::issue(email.clone(), "111111".to_owned(), now);
    repo.upsert(&first).await.unwrap();
    repo.mark_verified(&email).await.unwrap();

    // A fresh request discards the prior record entirely, verified or not
    let second = OtpRecord::issue(email.clone(), "222222".to_owned(), now);
    repo.upsert(&second).await.unwrap();

    let stored = repo.get(&email).await.unwrap().unwrap();
    assert_eq!(stored.code, "222222");
    assert!(!stored.verified);

    repo.delete(&email).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn test_second_account_delete_reports_missing() {
    let pool = test_pool().await;
    let repo = UserRepository::new(&pool);

    let handle = unique("gone");
    let email = Email::parse(&format!("{handle}@bakehouse.test")).unwrap();
    let user = repo
        .create("Short Lived", &email, &handle, "not-a-real-hash")
        .await
        .unwrap();

    assert!(repo.delete(user.id).await.unwrap());
    assert!(!repo.delete(user.id).await.unwrap());
}
