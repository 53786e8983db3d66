#![cfg(feature = "sqlite")]

//! Integration tests for the SQLite driver

use reschema_core::{Connection, ConnectionConfig, SchemaDriver, SchemaReader, Value};
use reschema_drivers::sqlite::{SqliteConnection, SqliteDriver};
use std::path::PathBuf;

/// Helper to create a test database with sample schema
async fn setup_test_database() -> SqliteConnection {
    let conn = SqliteConnection::open(":memory:").expect("Failed to create test database");

    let statements = [
        r#"CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            full_name TEXT
        )"#,
        r#"CREATE TABLE orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )"#,
        "CREATE UNIQUE INDEX UX_users_email ON users(email)",
        "CREATE INDEX IX_orders_user_id_quantity ON orders(user_id, quantity)",
    ];

    for statement in statements {
        conn.execute(statement, &[])
            .await
            .expect("Failed to setup schema");
    }

    conn
}

#[tokio::test]
async fn test_execute_and_query_with_parameters() {
    let conn = setup_test_database().await;

    let inserted = conn
        .execute(
            "INSERT INTO users (username, email) VALUES (?, ?)",
            &[
                Value::String("alice".to_string()),
                Value::String("alice@example.com".to_string()),
            ],
        )
        .await
        .expect("Failed to insert");
    assert_eq!(inserted.affected_rows, 1);

    let result = conn
        .query(
            "SELECT username, email FROM users WHERE username = ?",
            &[Value::String("alice".to_string())],
        )
        .await
        .expect("Failed to query");

    assert_eq!(result.rows.len(), 1);
    assert_eq!(
        result.rows[0].get(1).unwrap().as_str().unwrap(),
        "alice@example.com"
    );
    assert_eq!(result.columns, vec!["username", "email"]);
}

#[tokio::test]
async fn test_null_round_trip() {
    let conn = setup_test_database().await;

    conn.execute(
        "INSERT INTO users (username, email, full_name) VALUES (?, ?, ?)",
        &[
            Value::String("bob".to_string()),
            Value::String("bob@example.com".to_string()),
            Value::Null,
        ],
    )
    .await
    .expect("Failed to insert");

    let result = conn
        .query("SELECT full_name FROM users WHERE username = 'bob'", &[])
        .await
        .expect("Failed to query");
    assert!(result.rows[0].get(0).unwrap().is_null());
}

#[tokio::test]
async fn test_table_names() {
    let conn = setup_test_database().await;

    let tables = conn.table_names().await.expect("Failed to list tables");
    assert_eq!(tables, vec!["orders".to_string(), "users".to_string()]);
}

#[tokio::test]
async fn test_column_reflection() {
    let conn = setup_test_database().await;

    let columns = conn
        .column_names("users")
        .await
        .expect("Failed to list columns");
    assert_eq!(columns, vec!["id", "username", "email", "full_name"]);

    assert!(!conn.column_nullable("users", "username").await.unwrap());
    assert!(conn.column_nullable("users", "full_name").await.unwrap());
    assert_eq!(
        conn.column_data_type("users", "username").await.unwrap(),
        "TEXT"
    );
    assert!(conn.column_auto_increment("users", "id").await.unwrap());
    assert!(!conn.column_auto_increment("users", "email").await.unwrap());
}

#[tokio::test]
async fn test_missing_column_is_not_found() {
    let conn = setup_test_database().await;

    let err = conn.column_nullable("users", "missing").await.unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn test_primary_key_reflection() {
    let conn = setup_test_database().await;

    let pk = conn
        .primary_key_name("users")
        .await
        .expect("Failed to read primary key")
        .expect("users should have a primary key");
    let columns = conn.primary_key_columns("users", &pk).await.unwrap();
    assert_eq!(columns, vec!["id"]);
}

#[tokio::test]
async fn test_foreign_key_reflection() {
    let conn = setup_test_database().await;

    let fks = conn
        .foreign_key_names("orders")
        .await
        .expect("Failed to list foreign keys");
    assert_eq!(fks.len(), 1);

    let fk = &fks[0];
    assert_eq!(
        conn.foreign_key_columns("orders", fk).await.unwrap(),
        vec!["user_id"]
    );
    assert_eq!(
        conn.foreign_key_referenced_table("orders", fk).await.unwrap(),
        "users"
    );
    assert_eq!(
        conn.foreign_key_referenced_columns("orders", fk)
            .await
            .unwrap(),
        vec!["id"]
    );
}

#[tokio::test]
async fn test_index_reflection_preserves_column_order() {
    let conn = setup_test_database().await;

    let indexes = conn.index_names("orders").await.unwrap();
    assert_eq!(indexes, vec!["IX_orders_user_id_quantity".to_string()]);

    assert!(!conn
        .index_unique("orders", "IX_orders_user_id_quantity")
        .await
        .unwrap());
    assert!(conn.index_unique("users", "UX_users_email").await.unwrap());

    let columns = conn
        .index_columns("orders", "IX_orders_user_id_quantity")
        .await
        .unwrap();
    assert_eq!(columns, vec!["user_id", "quantity"]);
}

#[tokio::test]
async fn test_missing_index_has_no_columns() {
    let conn = setup_test_database().await;

    let columns = conn.index_columns("users", "IX_missing").await.unwrap();
    assert!(columns.is_empty());
}

#[tokio::test]
async fn test_execution_errors_propagate() {
    let conn = setup_test_database().await;

    let result = conn.query("SELECT * FROM nonexistent_table", &[]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_driver_lifecycle_is_file_based() {
    let driver = SqliteDriver::new();
    assert_eq!(driver.name(), "sqlite");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path: PathBuf = dir.path().join("lifecycle.db");
    let config = ConnectionConfig::new_sqlite(db_path.to_str().unwrap());

    assert!(!driver.database_exists(&config).await.unwrap());

    driver
        .create_database(&config)
        .await
        .expect("Failed to create database file");
    assert!(driver.database_exists(&config).await.unwrap());

    let conn = driver.connect(&config).await.expect("Failed to connect");
    conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[])
        .await
        .expect("Failed to create table");
    conn.close().await.expect("Failed to close");

    driver
        .drop_database(&config)
        .await
        .expect("Failed to drop database file");
    assert!(!driver.database_exists(&config).await.unwrap());

    // Dropping again is a caller error.
    assert!(driver.drop_database(&config).await.is_err());
}

#[tokio::test]
async fn test_closed_connection_rejects_statements() {
    let conn = setup_test_database().await;
    conn.close().await.unwrap();
    assert!(conn.is_closed());
    assert!(conn.query("SELECT 1", &[]).await.is_err());
}

#[tokio::test]
async fn test_registry_resolves_drivers() {
    let registry = reschema_drivers::DriverRegistry::with_defaults();
    assert!(registry.has("sqlite"));
    let driver = registry.get("sqlite").expect("sqlite should be registered");
    assert_eq!(driver.name(), "sqlite");
    assert!(registry.get("nonexistent").is_none());
}
