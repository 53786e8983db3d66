//! MS SQL Server driver implementation

use crate::{MssqlConnection, MssqlDialect};
use async_trait::async_trait;
use reschema_core::{Connection, ConnectionConfig, Result, SchemaDriver, SqlDialect};
use std::sync::Arc;

static DIALECT: MssqlDialect = MssqlDialect;

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaDriver for MssqlDriver {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        &DIALECT
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let port = if config.port > 0 { config.port } else { 1433 };
        let trust_cert = config
            .params
            .get("trust_cert")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let conn = MssqlConnection::connect(
            &config.host,
            port,
            config.database.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
            trust_cert,
        )
        .await?;

        Ok(Arc::new(conn))
    }

    fn admin_config(&self, config: &ConnectionConfig) -> Result<ConnectionConfig> {
        // Lifecycle statements run against the master database.
        Ok(config.clone().with_database(Some("master")))
    }
}
