//! PostgreSQL driver implementation

use crate::{PostgresConnection, PostgresDialect};
use async_trait::async_trait;
use reschema_core::{
    Connection, ConnectionConfig, Result, SchemaDriver, SchemaError, SqlDialect,
};
use std::sync::Arc;

static DIALECT: PostgresDialect = PostgresDialect;

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        tracing::debug!("PostgreSQL driver initialized");
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        &DIALECT
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let database = config.database.as_deref().ok_or_else(|| {
            SchemaError::Configuration("PostgreSQL requires a database name".into())
        })?;
        let port = if config.port > 0 { config.port } else { 5432 };

        let conn = PostgresConnection::connect(
            &config.host,
            port,
            database,
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .await?;

        Ok(Arc::new(conn))
    }

    fn admin_config(&self, config: &ConnectionConfig) -> Result<ConnectionConfig> {
        // Lifecycle statements run against the maintenance database.
        Ok(config.clone().with_database(Some("postgres")))
    }
}
