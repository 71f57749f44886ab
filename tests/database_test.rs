//! Database layer tests: raw parameterized SQL and migration bookkeeping.

mod common;

use sea_orm::Value;

use common::{connect, harness, registration, test_config};
use doorman::infra::Database;

#[tokio::test]
async fn test_migrations_are_applied_on_connect() {
    let db = connect(&test_config()).await;

    let status = db.migration_status().await.unwrap();
    assert_eq!(status.len(), 2);
    assert!(status.iter().all(|(_, applied)| *applied));
    db.ping().await.unwrap();
}

#[tokio::test]
async fn test_status_before_any_migration() {
    let db = Database::connect_without_migrations(&test_config())
        .await
        .unwrap();

    let status = db.migration_status().await.unwrap();
    assert!(status.iter().all(|(_, applied)| !*applied));

    db.run_migrations().await.unwrap();
    db.rollback_migration().await.unwrap();
    let status = db.migration_status().await.unwrap();
    assert_eq!(status.iter().filter(|(_, applied)| *applied).count(), 1);
}

#[tokio::test]
async fn test_raw_query_binds_parameters() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    h.auth
        .register(registration("bob", "bob@example.com"))
        .await
        .unwrap();

    let rows = h
        .database
        .fetch_all(
            "SELECT username, email FROM users WHERE username = ?",
            vec![Value::from("alice")],
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "alice@example.com");

    // A quote in the parameter is data, not SQL.
    let injected = h
        .database
        .fetch_all(
            "SELECT username FROM users WHERE username = ?",
            vec![Value::from("alice' OR '1'='1")],
        )
        .await
        .unwrap();
    assert!(injected.is_empty());
}

#[tokio::test]
async fn test_raw_execute_reports_rows_affected() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let affected = h
        .database
        .execute(
            "UPDATE users SET role = ? WHERE username = ?",
            vec![Value::from("admin"), Value::from("alice")],
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let missing = h
        .database
        .execute(
            "UPDATE users SET role = ? WHERE username = ?",
            vec![Value::from("admin"), Value::from("nobody")],
        )
        .await
        .unwrap();
    assert_eq!(missing, 0);
}
