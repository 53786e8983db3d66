//! Primary key handle

use crate::Database;
use reschema_core::{Result, SchemaError, validate};

/// Handle on one table's primary key (at most one per table).
///
/// Engines that cannot mutate an existing primary key through ALTER
/// statements fail both mutations with an explicit unsupported error
/// before any statement runs.
pub struct PrimaryKeyHandle<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> PrimaryKeyHandle<'a> {
    pub(crate) fn new(db: &'a Database, table: String) -> Self {
        Self { db, table }
    }

    /// The table's primary key, if one exists.
    pub async fn get(&self) -> Result<Option<PrimaryKey<'a>>> {
        let name = self.db.reader().await?.primary_key_name(&self.table).await?;
        Ok(name.map(|name| PrimaryKey {
            db: self.db,
            table: self.table.clone(),
            name,
        }))
    }

    /// Add a primary key over the given columns. Without an explicit
    /// name the naming convention supplies one.
    pub async fn add(&self, columns: &[&str], name: Option<&str>) -> Result<()> {
        let limit = self.db.max_identifier_length();
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        validate::identifiers(&columns, "columns", limit)?;

        let name = match name {
            Some(name) => {
                validate::identifier(name, "primaryKeyName", limit)?;
                name.to_string()
            }
            None => self.db.naming_convention().primary_key_name(&self.table),
        };

        tracing::debug!(table = %self.table, primary_key = %name, "adding primary key");
        let sql = self.db.ddl().add_primary_key(&self.table, &columns, &name)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Remove the table's primary key. Fails when none exists.
    pub async fn remove(&self) -> Result<()> {
        let name = self
            .db
            .reader()
            .await?
            .primary_key_name(&self.table)
            .await?
            .ok_or_else(|| {
                SchemaError::NotFound(format!("primary key on table \"{}\"", self.table))
            })?;

        tracing::debug!(table = %self.table, primary_key = %name, "removing primary key");
        let sql = self.db.ddl().remove_primary_key(&self.table, &name)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }
}

/// A reflected primary key handle.
pub struct PrimaryKey<'a> {
    db: &'a Database,
    table: String,
    name: String,
}

impl PrimaryKey<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key columns in key order.
    pub async fn columns(&self) -> Result<Vec<String>> {
        self.db
            .reader()
            .await?
            .primary_key_columns(&self.table, &self.name)
            .await
    }
}
