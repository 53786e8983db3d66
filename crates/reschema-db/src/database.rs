//! Database aggregate root

use crate::TableCollection;
use reschema_core::{
    Connection, ConnectionConfig, DdlGenerator, DefaultNamingConvention, DmlGenerator,
    NamingConvention, QueryResult, Result, SchemaDriver, SchemaReader, SqlDialect,
    StatementResult, Value,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One database, one connection, one caller.
///
/// Owns the driver handle, the explicit connection configuration, the
/// lazily opened target connection and the (swappable) naming
/// convention. The instance provides no internal synchronization:
/// concurrent use from multiple tasks is caller error — serialize
/// externally or use one instance per connection.
pub struct Database {
    driver: Arc<dyn SchemaDriver>,
    config: ConnectionConfig,
    connection: OnceCell<Arc<dyn Connection>>,
    naming: Box<dyn NamingConvention>,
}

impl Database {
    /// Create a database handle. No connection is opened until the first
    /// schema operation runs.
    pub fn new(driver: Arc<dyn SchemaDriver>, config: ConnectionConfig) -> Self {
        let naming = Box::new(DefaultNamingConvention::new(
            driver.dialect().max_identifier_length(),
        ));
        Self {
            driver,
            config,
            connection: OnceCell::new(),
            naming,
        }
    }

    /// The name of the configured database, if one is named.
    pub fn name(&self) -> Option<&str> {
        self.config.database.as_deref()
    }

    /// The active engine dialect.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        self.driver.dialect()
    }

    /// The convention used to derive index/key names when the caller
    /// supplies none.
    pub fn naming_convention(&self) -> &dyn NamingConvention {
        self.naming.as_ref()
    }

    /// Replace the naming convention.
    pub fn set_naming_convention(&mut self, naming: Box<dyn NamingConvention>) {
        self.naming = naming;
    }

    /// Collection of tables in the connected database.
    pub fn tables(&self) -> TableCollection<'_> {
        TableCollection::new(self)
    }

    /// Whether the configured database exists, probed through the
    /// driver's administrative connection.
    pub async fn exists(&self) -> Result<bool> {
        self.driver.database_exists(&self.config).await
    }

    /// Create the configured database.
    pub async fn create(&self) -> Result<()> {
        self.driver.create_database(&self.config).await
    }

    /// Drop the configured database. The cached target connection is
    /// closed and discarded first: no schema operation may interleave
    /// with the administrative switch.
    pub async fn remove(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close().await?;
        }
        self.driver.drop_database(&self.config).await
    }

    /// Release the underlying connection.
    pub async fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }

    pub(crate) async fn connection(&self) -> Result<&Arc<dyn Connection>> {
        self.connection
            .get_or_try_init(|| async { self.driver.connect(&self.config).await })
            .await
    }

    pub(crate) async fn reader(&self) -> Result<&dyn SchemaReader> {
        Ok(self.connection().await?.as_schema_reader())
    }

    pub(crate) fn ddl(&self) -> DdlGenerator<'static> {
        DdlGenerator::new(self.driver.dialect())
    }

    pub(crate) fn dml(&self) -> DmlGenerator<'static> {
        DmlGenerator::new(self.driver.dialect())
    }

    pub(crate) fn max_identifier_length(&self) -> usize {
        self.driver.dialect().max_identifier_length()
    }

    pub(crate) async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.connection().await?.execute(sql, params).await
    }

    /// Run a statement sequence in order, stopping at the first failure.
    /// Transaction scoping around a sequence of mutations belongs to the
    /// caller.
    pub(crate) async fn execute_all(&self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.execute(sql, &[]).await?;
        }
        Ok(())
    }

    pub(crate) async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.connection().await?.query(sql, params).await
    }
}
