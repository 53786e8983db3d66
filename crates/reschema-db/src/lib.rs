//! reschema - vendor-neutral schema reflection and mutation
//!
//! One API over SQLite, PostgreSQL, MySQL and MS SQL Server: enumerate
//! and mutate tables, columns, indexes, foreign keys and primary keys,
//! with every operation translated into the engine's own metadata
//! queries and DDL/DML statements.
//!
//! ```no_run
//! use reschema_core::{ColumnDef, ConnectionConfig, DataType, IndexDef};
//! use reschema_db::Database;
//! use std::sync::Arc;
//!
//! # async fn example(driver: Arc<dyn reschema_core::SchemaDriver>) -> reschema_core::Result<()> {
//! let db = Database::new(driver, ConnectionConfig::new_sqlite("app.db"));
//!
//! db.tables()
//!     .add(
//!         "Order",
//!         &[ColumnDef::new("OrderId", DataType::Integer)
//!             .primary_key()
//!             .auto_increment()],
//!         &[],
//!     )
//!     .await?;
//!
//! let order = db.tables().get("Order").await?.expect("just created");
//! order.indexes().add(IndexDef::on(["OrderId"]).unique()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every reflective read re-queries the engine's metadata, so results
//! always reflect concurrent external schema changes. One `Database`
//! instance serves one connection and one caller; concurrent use from
//! multiple tasks is undefined — serialize externally or use separate
//! instances.

mod columns;
mod database;
mod foreign_keys;
mod indexes;
mod primary_key;
mod rows;
mod tables;

pub use columns::{Column, ColumnCollection};
pub use database::Database;
pub use foreign_keys::{ForeignKey, ForeignKeyCollection};
pub use indexes::{Index, IndexCollection};
pub use primary_key::{PrimaryKey, PrimaryKeyHandle};
pub use rows::RowCollection;
pub use tables::{Table, TableCollection};

pub use reschema_core::{
    ColumnDef, ConnectionConfig, DataType, DefaultNamingConvention, ForeignKeyDef, IndexDef,
    NamingConvention, Result, SchemaDriver, SchemaError, Value,
};
