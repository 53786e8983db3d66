//! SQLite driver implementation
//!
//! SQLite has no administrative catalog: the database lifecycle is the
//! lifecycle of the database file, so the generic admin-connection
//! machinery is replaced with file-system operations.

use crate::{SqliteConnection, SqliteDialect};
use async_trait::async_trait;
use reschema_core::{
    Connection, ConnectionConfig, Result, SchemaDriver, SchemaError, SqlDialect,
};
use std::sync::Arc;

static DIALECT: SqliteDialect = SqliteDialect;

/// SQLite database driver
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        tracing::debug!("SQLite driver initialized");
        Self
    }

    fn path(config: &ConnectionConfig) -> Result<String> {
        config
            .get_string("path")
            .or_else(|| config.get_string("database"))
            .ok_or_else(|| {
                SchemaError::Configuration(
                    "SQLite requires a 'path' or 'database' value naming the database file".into(),
                )
            })
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        &DIALECT
    }

    #[tracing::instrument(skip(self, config))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let path = Self::path(config)?;
        let conn = SqliteConnection::open(&path)?;
        tracing::info!(path = %path, "SQLite connection created");
        Ok(Arc::new(conn))
    }

    fn admin_config(&self, config: &ConnectionConfig) -> Result<ConnectionConfig> {
        // No separate maintenance database; lifecycle is file-based.
        Ok(config.clone())
    }

    async fn database_exists(&self, config: &ConnectionConfig) -> Result<bool> {
        let path = Self::path(config)?;
        if path == ":memory:" {
            return Ok(true);
        }
        Ok(std::path::Path::new(&path).exists())
    }

    async fn create_database(&self, config: &ConnectionConfig) -> Result<()> {
        let path = Self::path(config)?;
        tracing::info!(path = %path, "creating SQLite database file");
        // Opening creates the file.
        let conn = SqliteConnection::open(&path)?;
        conn.close().await
    }

    async fn drop_database(&self, config: &ConnectionConfig) -> Result<()> {
        let path = Self::path(config)?;
        if path == ":memory:" {
            return Ok(());
        }
        tracing::info!(path = %path, "removing SQLite database file");
        if !std::path::Path::new(&path).exists() {
            return Err(SchemaError::NotFound(format!(
                "database file \"{}\"",
                path
            )));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }
}
