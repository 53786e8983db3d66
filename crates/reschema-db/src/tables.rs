//! Table collection and table handle

use crate::{
    ColumnCollection, Database, ForeignKeyCollection, IndexCollection, PrimaryKeyHandle,
    RowCollection,
};
use reschema_core::{ColumnDef, ForeignKeyDef, Result, validate};

/// Collection of all tables in the connected database.
///
/// Enumeration and lookup are computed from the live metadata surface on
/// every call; nothing is cached at construction time.
pub struct TableCollection<'a> {
    db: &'a Database,
}

impl<'a> TableCollection<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Names of all tables, freshly enumerated.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.db.reader().await?.table_names().await
    }

    /// Look up a table by name. Returns `None` when no such table
    /// exists.
    pub async fn get(&self, name: &str) -> Result<Option<Table<'a>>> {
        validate::identifier(name, "tableName", self.db.max_identifier_length())?;

        let dialect = self.db.dialect();
        let names = self.db.reader().await?.table_names().await?;
        Ok(names
            .into_iter()
            .find(|candidate| dialect.identifiers_equal(candidate, name))
            .map(|name| Table { db: self.db, name }))
    }

    /// Create a table with the given columns and, optionally, foreign
    /// keys. Foreign keys without an explicit name get one from the
    /// naming convention.
    pub async fn add(
        &self,
        name: &str,
        columns: &[ColumnDef],
        foreign_keys: &[ForeignKeyDef],
    ) -> Result<()> {
        let limit = self.db.max_identifier_length();
        validate::identifier(name, "tableName", limit)?;
        validate::non_empty_slice(columns, "columns")?;
        for column in columns {
            validate::identifier(&column.name, "columns", limit)?;
        }

        let mut resolved = Vec::with_capacity(foreign_keys.len());
        for foreign_key in foreign_keys {
            resolved.push(self.resolve_foreign_key(name, foreign_key)?);
        }

        tracing::debug!(table = %name, columns = columns.len(), "adding table");
        let sql = self.db.ddl().add_table(name, columns, &resolved)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop a table. Dropping a name that does not exist fails.
    pub async fn remove(&self, name: &str) -> Result<()> {
        validate::identifier(name, "tableName", self.db.max_identifier_length())?;

        tracing::debug!(table = %name, "removing table");
        let sql = self.db.ddl().remove_table(name);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Rename a table in place.
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let limit = self.db.max_identifier_length();
        validate::identifier(name, "tableName", limit)?;
        validate::identifier(new_name, "newTableName", limit)?;

        tracing::debug!(table = %name, new_table = %new_name, "renaming table");
        let sql = self.db.ddl().rename_table(name, new_name);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    fn resolve_foreign_key(&self, table: &str, foreign_key: &ForeignKeyDef) -> Result<ForeignKeyDef> {
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

        let mut resolved = foreign_key.clone();
        match &resolved.name {
            Some(name) => validate::identifier(name, "foreignKey.name", limit)?,
            None => {
                resolved.name = Some(
                    self.db
                        .naming_convention()
                        .foreign_key_name(table, &resolved.columns),
                );
            }
        }
        Ok(resolved)
    }
}

/// A reflected table handle. Attribute reads go to the live metadata
/// surface; nothing is cached on the handle beyond the name.
pub struct Table<'a> {
    db: &'a Database,
    name: String,
}

impl<'a> Table<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema the table lives in, where the engine has schemas.
    pub async fn schema_name(&self) -> Result<Option<String>> {
        self.db.reader().await?.table_schema(&self.name).await
    }

    /// Collection of columns in this table.
    pub fn columns(&self) -> ColumnCollection<'a> {
        ColumnCollection::new(self.db, self.name.clone())
    }

    /// Collection of indexes on this table.
    pub fn indexes(&self) -> IndexCollection<'a> {
        IndexCollection::new(self.db, self.name.clone())
    }

    /// Collection of foreign keys on this table.
    pub fn foreign_keys(&self) -> ForeignKeyCollection<'a> {
        ForeignKeyCollection::new(self.db, self.name.clone())
    }

    /// Handle on this table's primary key (zero or one).
    pub fn primary_key(&self) -> PrimaryKeyHandle<'a> {
        PrimaryKeyHandle::new(self.db, self.name.clone())
    }

    /// Row-level access used by schema changes and tests.
    pub fn rows(&self) -> RowCollection<'a> {
        RowCollection::new(self.db, self.name.clone())
    }
}
