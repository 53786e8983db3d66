//! SQLite driver implementation

mod connection;
mod dialect;
mod driver;
mod schema;

pub use connection::SqliteConnection;
pub use dialect::SqliteDialect;
pub use driver::SqliteDriver;
