//! End-to-end scenario and lifecycle tests

use reschema_core::{
    ColumnDef, ConnectionConfig, DataType, ForeignKeyDef, IndexDef, NamingConvention, Value,
};
use reschema_db::Database;
use reschema_drivers::sqlite::SqliteDriver;
use std::sync::Arc;

fn database() -> Database {
    let driver = Arc::new(SqliteDriver::new());
    Database::new(driver, ConnectionConfig::new_sqlite(":memory:"))
}

#[tokio::test]
async fn order_scenario() {
    let db = database();

    db.tables()
        .add("Customer", &[ColumnDef::new("CustomerId", DataType::Integer).primary_key()], &[])
        .await
        .unwrap();
    db.tables()
        .add(
            "Order",
            &[
                ColumnDef::new("OrderId", DataType::Integer).primary_key(),
                ColumnDef::new("CustomerId", DataType::Integer),
            ],
            &[ForeignKeyDef::new(["CustomerId"], "Customer", ["CustomerId"])],
        )
        .await
        .unwrap();
    let order = db.tables().get("Order").await.unwrap().expect("Order exists");

    // Add a nullable column and read its nullability back live.
    order
        .columns()
        .add(ColumnDef::new("CustomerName", DataType::NVarChar(50)).nullable())
        .await
        .unwrap();
    let customer_name = order.columns().get("CustomerName").await.unwrap().unwrap();
    assert!(customer_name.nullable().await.unwrap());

    // Unique index on OrderId: exactly one index, unique.
    order.indexes().add(IndexDef::on(["OrderId"]).unique()).await.unwrap();
    let index_names = order.indexes().names().await.unwrap();
    assert_eq!(index_names.len(), 1);
    let index = order.indexes().get(&index_names[0]).await.unwrap().unwrap();
    assert!(index.unique().await.unwrap());

    // The creation-time foreign key points at Customer(CustomerId).
    let fk_names = order.foreign_keys().names().await.unwrap();
    assert_eq!(fk_names.len(), 1);
    let fk = order.foreign_keys().get(&fk_names[0]).await.unwrap().unwrap();
    assert_eq!(fk.referenced_table().await.unwrap(), "Customer");
    assert_eq!(fk.referenced_columns().await.unwrap(), vec!["CustomerId"]);

    // Remove the index again: zero remain.
    order.indexes().remove(&index_names[0]).await.unwrap();
    assert!(order.indexes().names().await.unwrap().is_empty());
}

#[tokio::test]
async fn rows_round_trip_and_identity() {
    let db = database();
    db.tables()
        .add(
            "Ledger",
            &[
                ColumnDef::new("LedgerId", DataType::Integer)
                    .primary_key()
                    .auto_increment(),
                ColumnDef::new("Amount", DataType::Integer),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Ledger").await.unwrap().unwrap();

    table
        .rows()
        .add(&[("Amount".to_string(), Value::Int32(40))])
        .await
        .unwrap();
    table
        .rows()
        .add(&[("Amount".to_string(), Value::Int32(60))])
        .await
        .unwrap();

    assert_eq!(table.rows().count().await.unwrap(), 2);
    assert_eq!(
        table.rows().last_identity("LedgerId").await.unwrap().as_i64(),
        Some(2)
    );

    let updated = table
        .rows()
        .update(
            &[("Amount".to_string(), Value::Int32(100))],
            &[("LedgerId".to_string(), Value::Int64(1))],
        )
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let deleted = table
        .rows()
        .delete(&[("Amount".to_string(), Value::Int32(100))])
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(table.rows().count().await.unwrap(), 1);
}

#[tokio::test]
async fn set_value_backfills_every_row() {
    let db = database();
    db.tables()
        .add(
            "Backfill",
            &[
                ColumnDef::new("BackfillId", DataType::Integer).primary_key(),
                ColumnDef::new("Flag", DataType::Integer).nullable(),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Backfill").await.unwrap().unwrap();

    for id in 1..=3 {
        table
            .rows()
            .add(&[("BackfillId".to_string(), Value::Int32(id))])
            .await
            .unwrap();
    }

    let affected = table.rows().set_value("Flag", Value::Int32(1)).await.unwrap();
    assert_eq!(affected, 3);
}

struct SnakeCaseConvention;

impl NamingConvention for SnakeCaseConvention {
    fn index_name(&self, table: &str, columns: &[String], unique: bool) -> String {
        let prefix = if unique { "uq" } else { "ix" };
        format!("{}_{}_{}", prefix, table.to_lowercase(), columns.join("_").to_lowercase())
    }

    fn foreign_key_name(&self, table: &str, columns: &[String]) -> String {
        format!("fk_{}_{}", table.to_lowercase(), columns.join("_").to_lowercase())
    }

    fn primary_key_name(&self, table: &str) -> String {
        format!("pk_{}", table.to_lowercase())
    }
}

#[tokio::test]
async fn naming_convention_is_swappable() {
    let mut db = database();
    db.set_naming_convention(Box::new(SnakeCaseConvention));

    db.tables()
        .add(
            "Styled",
            &[
                ColumnDef::new("StyledId", DataType::Integer).primary_key(),
                ColumnDef::new("Code", DataType::Text),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Styled").await.unwrap().unwrap();

    table.indexes().add(IndexDef::on(["Code"])).await.unwrap();
    assert!(table.indexes().get("ix_styled_code").await.unwrap().is_some());
}

#[tokio::test]
async fn database_lifecycle_against_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifecycle.db");
    let config = ConnectionConfig::new_sqlite(path.to_str().unwrap());
    let mut db = Database::new(Arc::new(SqliteDriver::new()), config);

    assert!(!db.exists().await.unwrap());
    db.create().await.unwrap();
    assert!(db.exists().await.unwrap());

    db.tables()
        .add("T", &[ColumnDef::new("TId", DataType::Integer).primary_key()], &[])
        .await
        .unwrap();

    db.remove().await.unwrap();
    assert!(!db.exists().await.unwrap());
}

#[tokio::test]
async fn closed_database_can_reconnect_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reopen.db");
    let config = ConnectionConfig::new_sqlite(path.to_str().unwrap());
    let mut db = Database::new(Arc::new(SqliteDriver::new()), config);

    db.tables()
        .add("Persisted", &[ColumnDef::new("PersistedId", DataType::Integer).primary_key()], &[])
        .await
        .unwrap();
    db.close().await.unwrap();

    // The next operation opens a fresh connection against the same file.
    assert!(db.tables().get("Persisted").await.unwrap().is_some());
}
