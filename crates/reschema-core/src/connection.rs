//! Connection trait and explicit connection configuration

use crate::{QueryResult, Result, SchemaReader, StatementResult, Value};
use async_trait::async_trait;
use std::collections::HashMap;

/// A live engine connection.
///
/// One connection, one caller: implementations serialize access to the
/// underlying client but provide no other synchronization, perform no
/// retries, and every call is a single round trip to the engine.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Driver identifier (e.g. "sqlite", "postgres")
    fn driver_name(&self) -> &str;

    /// Execute a non-query statement with bound parameters.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query with bound parameters.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Close the connection. Further calls fail.
    async fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;

    /// The metadata read surface of this connection.
    fn as_schema_reader(&self) -> &dyn SchemaReader;
}

/// Explicit connection configuration passed to drivers and the database
/// aggregate. There is no ambient configuration lookup; callers construct
/// this value themselves.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Driver id (e.g. "postgres", "mysql", "sqlite", "mssql")
    pub driver: String,
    /// Host address (empty for file-based engines)
    pub host: String,
    /// Port (0 = driver default)
    pub port: u16,
    /// Database name or file path
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Additional driver parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            host: String::new(),
            port: 0,
            database: None,
            username: None,
            password: None,
            params: HashMap::new(),
        }
    }

    /// SQLite configuration for a database file path (or `:memory:`).
    pub fn new_sqlite(path: &str) -> Self {
        let mut config = Self::new("sqlite");
        config.database = Some(path.to_string());
        config
    }

    pub fn new_postgres(host: &str, port: u16, database: &str, username: &str) -> Self {
        let mut config = Self::new("postgres");
        config.host = host.to_string();
        config.port = port;
        config.database = Some(database.to_string());
        config.username = Some(username.to_string());
        config
    }

    pub fn new_mysql(host: &str, port: u16, database: &str, username: &str) -> Self {
        let mut config = Self::new("mysql");
        config.host = host.to_string();
        config.port = port;
        config.database = Some(database.to_string());
        config.username = Some(username.to_string());
        config
    }

    pub fn new_mssql(host: &str, port: u16, database: &str, username: &str) -> Self {
        let mut config = Self::new("mssql");
        config.host = host.to_string();
        config.port = port;
        config.database = Some(database.to_string());
        config.username = Some(username.to_string());
        config
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Replace the target database, keeping all other settings.
    pub fn with_database(mut self, database: Option<&str>) -> Self {
        self.database = database.map(str::to_string);
        self
    }

    /// Parameter lookup that also resolves the well-known field names.
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(value) = self.params.get(key) {
            return Some(value.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" | "path" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }
}
