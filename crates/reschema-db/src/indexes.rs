//! Index collection and index handle

use crate::Database;
use reschema_core::{IndexDef, Result, validate};

/// Collection of all indexes on one table.
pub struct IndexCollection<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> IndexCollection<'a> {
    pub(crate) fn new(db: &'a Database, table: String) -> Self {
        Self { db, table }
    }

    /// Index names, freshly enumerated.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.db.reader().await?.index_names(&self.table).await
    }

    /// Look up an index by name. An index with zero matching columns
    /// does not exist.
    pub async fn get(&self, name: &str) -> Result<Option<Index<'a>>> {
        validate::identifier(name, "indexName", self.db.max_identifier_length())?;

        let columns = self
            .db
            .reader()
            .await?
            .index_columns(&self.table, name)
            .await?;
        Ok((!columns.is_empty()).then(|| Index {
            db: self.db,
            table: self.table.clone(),
            name: name.to_string(),
        }))
    }

    /// Create an index. Without an explicit name the naming convention
    /// supplies one, discriminating unique from non-unique.
    pub async fn add(&self, index: IndexDef) -> Result<()> {
        let limit = self.db.max_identifier_length();
        validate::identifiers(&index.columns, "index.columns", limit)?;
        for column in &index.include_columns {
            validate::identifier(column, "index.includeColumns", limit)?;
        }

        let name = match &index.name {
            Some(name) => {
                validate::identifier(name, "index.name", limit)?;
                name.clone()
            }
            None => self
                .db
                .naming_convention()
                .index_name(&self.table, &index.columns, index.unique),
        };

        tracing::debug!(table = %self.table, index = %name, unique = index.unique, "adding index");
        let sql = self.db.ddl().add_index(
            &self.table,
            &index.columns,
            index.unique,
            &name,
            &index.include_columns,
        )?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop an index. Dropping a name that does not exist fails.
    pub async fn remove(&self, name: &str) -> Result<()> {
        validate::identifier(name, "indexName", self.db.max_identifier_length())?;

        tracing::debug!(table = %self.table, index = %name, "removing index");
        let sql = self.db.ddl().remove_index(&self.table, name);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop every index on the table.
    pub async fn remove_all(&self) -> Result<()> {
        for name in self.names().await? {
            self.remove(&name).await?;
        }
        Ok(())
    }
}

/// A reflected index handle.
pub struct Index<'a> {
    db: &'a Database,
    table: String,
    name: String,
}

impl Index<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn unique(&self) -> Result<bool> {
        self.db
            .reader()
            .await?
            .index_unique(&self.table, &self.name)
            .await
    }

    /// Key columns in index order.
    pub async fn columns(&self) -> Result<Vec<String>> {
        self.db
            .reader()
            .await?
            .index_columns(&self.table, &self.name)
            .await
    }
}
