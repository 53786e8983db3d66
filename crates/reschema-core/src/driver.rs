//! Schema driver trait
//!
//! One implementation per engine. Besides opening connections, a driver
//! owns the database lifecycle: existence probe, create and drop run
//! against a short-lived administrative connection targeting the engine's
//! maintenance database, never against the target connection. File-based
//! engines override the lifecycle methods entirely.

use crate::{
    Connection, ConnectionConfig, DdlGenerator, Result, SchemaError, SqlDialect,
};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait SchemaDriver: Send + Sync {
    /// Driver identifier (e.g. "sqlite", "postgres")
    fn name(&self) -> &'static str;

    /// The engine's SQL dialect.
    fn dialect(&self) -> &'static dyn SqlDialect;

    /// Open a connection to the configured database.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Derive the administrative configuration from a target
    /// configuration (same server, maintenance database).
    fn admin_config(&self, config: &ConnectionConfig) -> Result<ConnectionConfig>;

    /// Whether the configured database exists.
    async fn database_exists(&self, config: &ConnectionConfig) -> Result<bool> {
        let name = target_database(config)?;
        let probe = self.dialect().database_exists_query(&name)?;

        let admin = self.admin_config(config)?;
        let connection = self.connect(&admin).await?;
        let result = connection.query(&probe.sql, &probe.params).await;
        connection.close().await?;

        Ok(result?.has_rows())
    }

    /// Create the configured database through the administrative
    /// connection.
    async fn create_database(&self, config: &ConnectionConfig) -> Result<()> {
        let name = target_database(config)?;
        tracing::info!(driver = self.name(), database = %name, "creating database");

        let admin = self.admin_config(config)?;
        let connection = self.connect(&admin).await?;
        let sql = DdlGenerator::new(self.dialect()).create_database(&name);
        let result = connection.execute(&sql, &[]).await;
        connection.close().await?;

        result.map(|_| ())
    }

    /// Drop the configured database through the administrative
    /// connection.
    async fn drop_database(&self, config: &ConnectionConfig) -> Result<()> {
        let name = target_database(config)?;
        tracing::info!(driver = self.name(), database = %name, "dropping database");

        let admin = self.admin_config(config)?;
        let connection = self.connect(&admin).await?;
        let sql = DdlGenerator::new(self.dialect()).drop_database(&name);
        let result = connection.execute(&sql, &[]).await;
        connection.close().await?;

        result.map(|_| ())
    }
}

/// The database name a lifecycle operation targets.
pub fn target_database(config: &ConnectionConfig) -> Result<String> {
    config.database.clone().ok_or_else(|| {
        SchemaError::Configuration("connection configuration names no database".into())
    })
}
