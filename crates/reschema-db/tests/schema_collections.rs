//! Collection semantics against a live SQLite database

use reschema_core::{ColumnDef, ConnectionConfig, DataType, ForeignKeyDef, IndexDef, SchemaError, Value};
use reschema_db::Database;
use reschema_drivers::sqlite::SqliteDriver;
use std::sync::Arc;

fn database() -> Database {
    let driver = Arc::new(SqliteDriver::new());
    Database::new(driver, ConnectionConfig::new_sqlite(":memory:"))
}

fn id_column(name: &str) -> ColumnDef {
    ColumnDef::new(name, DataType::Integer).primary_key()
}

#[tokio::test]
async fn add_adds_table_with_supplied_columns() {
    let db = database();

    db.tables()
        .add(
            "AddTable",
            &[
                id_column("AddTableId"),
                ColumnDef::new("Name", DataType::Text).nullable(),
            ],
            &[],
        )
        .await
        .unwrap();

    let table = db.tables().get("AddTable").await.unwrap().expect("table exists");
    assert_eq!(table.columns().names().await.unwrap().len(), 2);
}

#[tokio::test]
async fn lookup_of_missing_table_returns_none() {
    let db = database();
    assert!(db.tables().get("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn remove_drops_table_and_second_remove_fails() {
    let db = database();
    db.tables()
        .add("RemoveTable", &[id_column("RemoveTableId")], &[])
        .await
        .unwrap();

    db.tables().remove("RemoveTable").await.unwrap();
    assert!(db.tables().get("RemoveTable").await.unwrap().is_none());

    // No IF EXISTS: dropping an absent table surfaces the engine error.
    assert!(db.tables().remove("RemoveTable").await.is_err());
}

#[tokio::test]
async fn rename_moves_table_to_new_name() {
    let db = database();
    db.tables()
        .add("OldName", &[id_column("OldNameId")], &[])
        .await
        .unwrap();

    db.tables().rename("OldName", "NewName").await.unwrap();

    assert!(db.tables().get("OldName").await.unwrap().is_none());
    assert!(db.tables().get("NewName").await.unwrap().is_some());
}

#[tokio::test]
async fn enumeration_is_stable_without_mutation() {
    let db = database();
    db.tables().add("A", &[id_column("AId")], &[]).await.unwrap();
    db.tables().add("B", &[id_column("BId")], &[]).await.unwrap();

    let first = db.tables().names().await.unwrap();
    let second = db.tables().names().await.unwrap();
    assert_eq!(first, second);

    // And it reflects mutations on the next call, not a snapshot.
    db.tables().remove("A").await.unwrap();
    assert_eq!(db.tables().names().await.unwrap(), vec!["B".to_string()]);
}

#[tokio::test]
async fn add_validation_names_the_offending_argument() {
    let db = database();

    let err = db.tables().add("", &[id_column("Id")], &[]).await.unwrap_err();
    assert!(matches!(err, SchemaError::Validation(_)));
    assert!(err.to_string().contains("tableName"));

    let err = db.tables().add("NoColumns", &[], &[]).await.unwrap_err();
    assert!(err.to_string().contains("columns"));

    let long_name = "x".repeat(4096);
    let err = db.tables().add(&long_name, &[id_column("Id")], &[]).await.unwrap_err();
    assert!(err.to_string().contains("2048"));
}

#[tokio::test]
async fn columns_can_be_added_renamed_and_removed() {
    let db = database();
    db.tables()
        .add("ColumnOps", &[id_column("ColumnOpsId")], &[])
        .await
        .unwrap();
    let table = db.tables().get("ColumnOps").await.unwrap().unwrap();

    table
        .columns()
        .add(ColumnDef::new("Added", DataType::Text).nullable())
        .await
        .unwrap();
    assert_eq!(table.columns().names().await.unwrap().len(), 2);

    table.columns().rename("Added", "Renamed").await.unwrap();
    assert!(table.columns().get("Added").await.unwrap().is_none());
    assert!(table.columns().get("Renamed").await.unwrap().is_some());

    table.columns().remove("Renamed").await.unwrap();
    assert_eq!(table.columns().names().await.unwrap().len(), 1);

    // Removing an already-removed column is a caller error.
    assert!(table.columns().remove("Renamed").await.is_err());
}

#[tokio::test]
async fn nullable_column_needs_no_default_on_populated_table() {
    let db = database();
    db.tables()
        .add("NullableAdd", &[id_column("NullableAddId")], &[])
        .await
        .unwrap();
    let table = db.tables().get("NullableAdd").await.unwrap().unwrap();
    table
        .rows()
        .add(&[("NullableAddId".to_string(), Value::Int32(1))])
        .await
        .unwrap();

    table
        .columns()
        .add(ColumnDef::new("Note", DataType::Text).nullable())
        .await
        .unwrap();

    let column = table.columns().get("Note").await.unwrap().unwrap();
    assert!(column.nullable().await.unwrap());
}

#[tokio::test]
async fn non_nullable_column_on_populated_table_requires_default() {
    let db = database();
    db.tables()
        .add("NotNullAdd", &[id_column("NotNullAddId")], &[])
        .await
        .unwrap();
    let table = db.tables().get("NotNullAdd").await.unwrap().unwrap();
    table
        .rows()
        .add(&[("NotNullAddId".to_string(), Value::Int32(1))])
        .await
        .unwrap();

    let err = table
        .columns()
        .add(ColumnDef::new("Quantity", DataType::Integer))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Validation(_)));
    assert!(err.to_string().contains("Quantity"));

    table
        .columns()
        .add_with_default(ColumnDef::new("Quantity", DataType::Integer), Value::Int32(5))
        .await
        .unwrap();

    let column = table.columns().get("Quantity").await.unwrap().unwrap();
    assert!(!column.nullable().await.unwrap());

    let result = db
        .tables()
        .get("NotNullAdd")
        .await
        .unwrap()
        .unwrap()
        .rows()
        .count()
        .await
        .unwrap();
    assert_eq!(result, 1);
}

#[tokio::test]
async fn non_nullable_column_with_declared_default_needs_no_backfill() {
    let db = database();
    db.tables()
        .add("EmptyAdd", &[id_column("EmptyAddId")], &[])
        .await
        .unwrap();
    let table = db.tables().get("EmptyAdd").await.unwrap().unwrap();

    table
        .columns()
        .add(ColumnDef::new("Required", DataType::Text).default_value(Value::String("x".into())))
        .await
        .unwrap();

    let column = table.columns().get("Required").await.unwrap().unwrap();
    assert!(!column.nullable().await.unwrap());
}

#[tokio::test]
async fn column_attributes_are_read_live() {
    let db = database();
    db.tables()
        .add(
            "Attrs",
            &[
                ColumnDef::new("AttrsId", DataType::Integer)
                    .primary_key()
                    .auto_increment(),
                ColumnDef::new("Label", DataType::Text).nullable(),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Attrs").await.unwrap().unwrap();

    let id = table.columns().get("AttrsId").await.unwrap().unwrap();
    assert!(id.auto_increment().await.unwrap());
    assert_eq!(id.data_type().await.unwrap(), "INTEGER");

    let label = table.columns().get("Label").await.unwrap().unwrap();
    assert!(!label.auto_increment().await.unwrap());
    assert_eq!(label.data_type().await.unwrap(), "TEXT");
}

#[tokio::test]
async fn indexes_use_the_naming_convention_when_unnamed() {
    let db = database();
    db.tables()
        .add(
            "Indexed",
            &[id_column("IndexedId"), ColumnDef::new("Code", DataType::Text)],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Indexed").await.unwrap().unwrap();

    table.indexes().add(IndexDef::on(["Code"])).await.unwrap();

    let expected = db
        .naming_convention()
        .index_name("Indexed", &["Code".to_string()], false);
    assert_eq!(expected, "IX_Indexed_Code");
    assert!(table.indexes().get(&expected).await.unwrap().is_some());

    // The unique flavour of the same columns gets a different name.
    table
        .indexes()
        .add(IndexDef::on(["Code"]).unique())
        .await
        .unwrap();
    let unique_name = db
        .naming_convention()
        .index_name("Indexed", &["Code".to_string()], true);
    assert_ne!(expected, unique_name);

    let index = table.indexes().get(&unique_name).await.unwrap().unwrap();
    assert!(index.unique().await.unwrap());
}

#[tokio::test]
async fn composite_index_column_order_round_trips() {
    let db = database();
    db.tables()
        .add(
            "Composite",
            &[
                id_column("CompositeId"),
                ColumnDef::new("B", DataType::Integer),
                ColumnDef::new("A", DataType::Integer),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Composite").await.unwrap().unwrap();

    table
        .indexes()
        .add(IndexDef::on(["B", "A"]).named("IX_Composite_BA"))
        .await
        .unwrap();

    let index = table.indexes().get("IX_Composite_BA").await.unwrap().unwrap();
    assert_eq!(index.columns().await.unwrap(), vec!["B", "A"]);
}

#[tokio::test]
async fn missing_index_lookup_returns_none_and_remove_fails() {
    let db = database();
    db.tables()
        .add("NoIndex", &[id_column("NoIndexId")], &[])
        .await
        .unwrap();
    let table = db.tables().get("NoIndex").await.unwrap().unwrap();

    assert!(table.indexes().get("IX_Missing").await.unwrap().is_none());
    assert!(table.indexes().remove("IX_Missing").await.is_err());
}

#[tokio::test]
async fn remove_all_drops_every_index() {
    let db = database();
    db.tables()
        .add(
            "ManyIndexes",
            &[
                id_column("ManyIndexesId"),
                ColumnDef::new("A", DataType::Integer),
                ColumnDef::new("B", DataType::Integer),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("ManyIndexes").await.unwrap().unwrap();

    table.indexes().add(IndexDef::on(["A"])).await.unwrap();
    table.indexes().add(IndexDef::on(["B"])).await.unwrap();
    assert_eq!(table.indexes().names().await.unwrap().len(), 2);

    table.indexes().remove_all().await.unwrap();
    assert!(table.indexes().names().await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_keys_from_table_creation_reflect_target() {
    let db = database();
    db.tables()
        .add("Customer", &[id_column("CustomerId")], &[])
        .await
        .unwrap();
    db.tables()
        .add(
            "Order",
            &[
                id_column("OrderId"),
                ColumnDef::new("CustomerId", DataType::Integer),
            ],
            &[ForeignKeyDef::new(["CustomerId"], "Customer", ["CustomerId"])],
        )
        .await
        .unwrap();

    let order = db.tables().get("Order").await.unwrap().unwrap();
    let names = order.foreign_keys().names().await.unwrap();
    assert_eq!(names.len(), 1);

    let fk = order.foreign_keys().get(&names[0]).await.unwrap().unwrap();
    assert_eq!(fk.columns().await.unwrap(), vec!["CustomerId"]);
    assert_eq!(fk.referenced_table().await.unwrap(), "Customer");
    assert_eq!(fk.referenced_columns().await.unwrap(), vec!["CustomerId"]);
}

#[tokio::test]
async fn foreign_key_column_lists_must_correspond() {
    let db = database();
    db.tables()
        .add("Target", &[id_column("TargetId")], &[])
        .await
        .unwrap();

    let mismatched = ForeignKeyDef {
        columns: vec!["A".to_string(), "B".to_string()],
        referenced_table: "Target".to_string(),
        referenced_columns: vec!["TargetId".to_string()],
        name: None,
    };
    let err = db
        .tables()
        .add(
            "Source",
            &[
                id_column("SourceId"),
                ColumnDef::new("A", DataType::Integer),
                ColumnDef::new("B", DataType::Integer),
            ],
            &[mismatched],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SchemaError::Validation(_)));
    assert!(err.to_string().contains("positionally"));
}

#[tokio::test]
async fn primary_key_reflects_creation_time_key() {
    let db = database();
    db.tables()
        .add(
            "Keyed",
            &[
                ColumnDef::new("KeyedId", DataType::Integer).primary_key(),
                ColumnDef::new("Other", DataType::Integer),
            ],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("Keyed").await.unwrap().unwrap();

    let pk = table.primary_key().get().await.unwrap().expect("primary key exists");
    assert_eq!(pk.columns().await.unwrap(), vec!["KeyedId"]);
}

#[tokio::test]
async fn primary_key_mutation_is_unsupported_on_sqlite() {
    let db = database();
    db.tables()
        .add("PkAlter", &[ColumnDef::new("PkAlterId", DataType::Integer)], &[])
        .await
        .unwrap();
    let table = db.tables().get("PkAlter").await.unwrap().unwrap();

    let err = table.primary_key().add(&["PkAlterId"], None).await.unwrap_err();
    assert!(matches!(err, SchemaError::NotSupported(_)));

    // Removing on a table that has a key is equally unsupported.
    db.tables()
        .add("PkRemove", &[id_column("PkRemoveId")], &[])
        .await
        .unwrap();
    let keyed = db.tables().get("PkRemove").await.unwrap().unwrap();
    let err = keyed.primary_key().remove().await.unwrap_err();
    assert!(matches!(err, SchemaError::NotSupported(_)));
}

#[tokio::test]
async fn primary_key_remove_without_key_is_not_found() {
    let db = database();
    db.tables()
        .add("Unkeyed", &[ColumnDef::new("UnkeyedId", DataType::Integer)], &[])
        .await
        .unwrap();
    let table = db.tables().get("Unkeyed").await.unwrap().unwrap();

    let err = table.primary_key().remove().await.unwrap_err();
    assert!(matches!(err, SchemaError::NotFound(_)));
}

#[tokio::test]
async fn foreign_key_alter_is_unsupported_on_sqlite() {
    let db = database();
    db.tables()
        .add("FkTarget", &[id_column("FkTargetId")], &[])
        .await
        .unwrap();
    db.tables()
        .add(
            "FkSource",
            &[id_column("FkSourceId"), ColumnDef::new("Ref", DataType::Integer)],
            &[],
        )
        .await
        .unwrap();
    let table = db.tables().get("FkSource").await.unwrap().unwrap();

    let err = table
        .foreign_keys()
        .add(ForeignKeyDef::new(["Ref"], "FkTarget", ["FkTargetId"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::NotSupported(_)));
}
