//! Foreign key collection and handle

use crate::Database;
use reschema_core::{ForeignKeyDef, Result, validate};

/// Collection of all foreign keys on one table.
pub struct ForeignKeyCollection<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> ForeignKeyCollection<'a> {
    pub(crate) fn new(db: &'a Database, table: String) -> Self {
        Self { db, table }
    }

    /// Foreign key names, freshly enumerated.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.db.reader().await?.foreign_key_names(&self.table).await
    }

    /// Look up a foreign key by name. Returns `None` when no such key
    /// exists.
    pub async fn get(&self, name: &str) -> Result<Option<ForeignKey<'a>>> {
        validate::identifier(name, "foreignKeyName", self.db.max_identifier_length())?;

        let dialect = self.db.dialect();
        let names = self.db.reader().await?.foreign_key_names(&self.table).await?;
        Ok(names
            .into_iter()
            .find(|candidate| dialect.identifiers_equal(candidate, name))
            .map(|name| ForeignKey {
                db: self.db,
                table: self.table.clone(),
                name,
            }))
    }

    /// Add a foreign key. Local and referenced columns correspond
    /// positionally and must have the same length. Without an explicit
    /// name the naming convention supplies one.
    pub async fn add(&self, foreign_key: ForeignKeyDef) -> Result<()> {
        let limit = self.db.max_identifier_length();
        validate::identifiers(&foreign_key.columns, "foreignKey.columns", limit)?;
        validate::identifier(
            &foreign_key.referenced_table,
            "foreignKey.referencedTable",
            limit,
        )?;
        validate::identifiers(
            &foreign_key.referenced_columns,
            "foreignKey.referencedColumns",
            limit,
        )?;
        validate::same_length(
            &foreign_key.columns,
            &foreign_key.referenced_columns,
            "foreignKey.columns",
            "foreignKey.referencedColumns",
        )?;

        let name = match &foreign_key.name {
            Some(name) => {
                validate::identifier(name, "foreignKey.name", limit)?;
                name.clone()
            }
            None => self
                .db
                .naming_convention()
                .foreign_key_name(&self.table, &foreign_key.columns),
        };

        tracing::debug!(table = %self.table, foreign_key = %name, "adding foreign key");
        let sql = self.db.ddl().add_foreign_key(&self.table, &foreign_key, &name)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop a foreign key. Dropping a name that does not exist fails.
    pub async fn remove(&self, name: &str) -> Result<()> {
        validate::identifier(name, "foreignKeyName", self.db.max_identifier_length())?;

        tracing::debug!(table = %self.table, foreign_key = %name, "removing foreign key");
        let sql = self.db.ddl().remove_foreign_key(&self.table, name)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }
}

/// A reflected foreign key handle.
pub struct ForeignKey<'a> {
    db: &'a Database,
    table: String,
    name: String,
}

impl ForeignKey<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local columns in key order.
    pub async fn columns(&self) -> Result<Vec<String>> {
        self.db
            .reader()
            .await?
            .foreign_key_columns(&self.table, &self.name)
            .await
    }

    pub async fn referenced_table(&self) -> Result<String> {
        self.db
            .reader()
            .await?
            .foreign_key_referenced_table(&self.table, &self.name)
            .await
    }

    /// Referenced columns, positionally matching [`columns`](Self::columns).
    pub async fn referenced_columns(&self) -> Result<Vec<String>> {
        self.db
            .reader()
            .await?
            .foreign_key_referenced_columns(&self.table, &self.name)
            .await
    }
}
