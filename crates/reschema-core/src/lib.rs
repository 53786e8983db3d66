//! reschema core - traits and types for cross-engine schema tooling
//!
//! This crate defines everything the engine drivers and the caller-facing
//! database API share:
//!
//! - `Connection` - statement execution over one live connection
//! - `SchemaReader` - the read-only metadata surface
//! - `SqlDialect` - per-engine quoting, limits, types and statement shapes
//! - `SchemaDriver` - connecting and database lifecycle
//! - `DdlGenerator` / `DmlGenerator` - statement builders over a dialect
//! - `NamingConvention` - derived constraint/index names
//! - Common types like `Value`, `Row`, `DataType`, `ColumnDef`

mod connection;
mod ddl;
mod dialect;
mod dml;
mod driver;
mod error;
mod naming;
mod schema;
mod types;
pub mod validate;

pub use connection::*;
pub use ddl::*;
pub use dialect::*;
pub use dml::*;
pub use driver::*;
pub use error::*;
pub use naming::*;
pub use schema::*;
pub use types::*;
