//! Statement-shape tests for the SQL Server dialect

use crate::MssqlDialect;
use pretty_assertions::assert_eq;
use reschema_core::{ColumnDef, DataType, DdlGenerator, DmlGenerator, SqlDialect, Value};

static DIALECT: MssqlDialect = MssqlDialect;

fn ddl() -> DdlGenerator<'static> {
    DdlGenerator::new(&DIALECT)
}

fn dml() -> DmlGenerator<'static> {
    DmlGenerator::new(&DIALECT)
}

#[test]
fn brackets_escape_identifiers() {
    assert_eq!(DIALECT.escape_identifier("Order"), "[Order]");
    assert_eq!(DIALECT.escape_identifier("weird]name"), "[weird]]name]");
}

#[test]
fn create_table_with_identity_primary_key() {
    let sql = ddl()
        .add_table(
            "Order",
            &[
                ColumnDef::new("OrderId", DataType::Integer)
                    .primary_key()
                    .auto_increment(),
                ColumnDef::new("CustomerName", DataType::NVarChar(50)).nullable(),
            ],
            &[],
        )
        .expect("should generate DDL");

    assert_eq!(
        sql,
        "CREATE TABLE [Order] ([OrderId] INT PRIMARY KEY IDENTITY(1,1), [CustomerName] NVARCHAR(50))"
    );
}

#[test]
fn rename_goes_through_sp_rename() {
    assert_eq!(
        ddl().rename_table("Order", "Orders"),
        "EXEC sp_rename 'Order', 'Orders'"
    );
    assert_eq!(
        ddl().rename_column("Order", "CustomerName", "Customer"),
        "EXEC sp_rename 'Order.CustomerName', 'Customer', 'COLUMN'"
    );
}

#[test]
fn add_column_with_default_uses_named_constraint() {
    let statements = ddl()
        .add_column_with_default(
            "Order",
            &ColumnDef::new("Quantity", DataType::Integer),
            &Value::Int32(1),
        )
        .expect("should generate DDL");

    assert_eq!(
        statements,
        vec![
            "ALTER TABLE [Order] ADD [Quantity] INT NOT NULL CONSTRAINT [DF_Order_Quantity] DEFAULT 1"
                .to_string(),
            "ALTER TABLE [Order] DROP CONSTRAINT [DF_Order_Quantity]".to_string(),
        ]
    );
}

#[test]
fn index_with_include_columns() {
    let sql = ddl()
        .add_index(
            "Order",
            &["OrderId".to_string()],
            false,
            "IX_Order_OrderId",
            &["CustomerName".to_string()],
        )
        .expect("should generate DDL");

    assert_eq!(
        sql,
        "CREATE INDEX [IX_Order_OrderId] ON [Order] ([OrderId]) INCLUDE ([CustomerName])"
    );
}

#[test]
fn drop_index_names_the_table() {
    assert_eq!(
        ddl().remove_index("Order", "IX_Order_OrderId"),
        "DROP INDEX [IX_Order_OrderId] ON [Order]"
    );
}

#[test]
fn alter_column_restates_type_and_nullability() {
    let statements = ddl()
        .change_column("Order", &ColumnDef::new("CustomerName", DataType::NVarChar(100)).nullable())
        .expect("should generate DDL");

    assert_eq!(
        statements,
        vec!["ALTER TABLE [Order] ALTER COLUMN [CustomerName] NVARCHAR(100) NULL".to_string()]
    );
}

#[test]
fn dml_uses_numbered_at_placeholders() {
    let statement = dml().insert(
        "Order",
        &[
            ("OrderId".to_string(), Value::Int32(1)),
            ("CustomerName".to_string(), Value::String("Acme".into())),
        ],
    );

    assert_eq!(
        statement.sql,
        "INSERT INTO [Order] ([OrderId], [CustomerName]) VALUES (@P1, @P2)"
    );
    assert_eq!(statement.params.len(), 2);
}

#[test]
fn unicode_string_literals_take_the_n_prefix() {
    assert_eq!(
        DIALECT.literal(&Value::String("O'Brien".into())),
        "N'O''Brien'"
    );
    assert_eq!(DIALECT.literal(&Value::Bool(true)), "1");
}
