//! MySQL driver implementation

use crate::{MySqlConnection, MySqlDialect};
use async_trait::async_trait;
use reschema_core::{Connection, ConnectionConfig, Result, SchemaDriver, SqlDialect};
use std::sync::Arc;

static DIALECT: MySqlDialect = MySqlDialect;

/// MySQL/MariaDB database driver
pub struct MySqlDriver;

impl MySqlDriver {
    pub fn new() -> Self {
        tracing::debug!("MySQL driver initialized");
        Self
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaDriver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        &DIALECT
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let port = if config.port > 0 { config.port } else { 3306 };
        let conn = MySqlConnection::connect(
            &config.host,
            port,
            config.database.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .await?;

        Ok(Arc::new(conn))
    }

    fn admin_config(&self, config: &ConnectionConfig) -> Result<ConnectionConfig> {
        // Lifecycle statements run without a selected database.
        Ok(config.clone().with_database(None))
    }
}
