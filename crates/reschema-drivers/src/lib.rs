//! reschema drivers - engine driver implementations
//!
//! Concrete implementations of the driver traits defined in
//! `reschema-core`, one crate per engine, re-exported here behind
//! feature gates.

#[cfg(feature = "mssql")]
pub use reschema_driver_mssql as mssql;
#[cfg(feature = "mysql")]
pub use reschema_driver_mysql as mysql;
#[cfg(feature = "postgres")]
pub use reschema_driver_postgres as postgres;
#[cfg(feature = "sqlite")]
pub use reschema_driver_sqlite as sqlite;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from reschema-core
pub use reschema_core::{
    Connection, ConnectionConfig, QueryResult, Result, Row, SchemaDriver, SchemaError,
    SchemaReader, StatementResult, Value,
};
