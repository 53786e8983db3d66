//! Column collection and column handle

use crate::Database;
use reschema_core::{ColumnDef, Result, SchemaError, Value, validate};

/// Collection of all columns in one table.
pub struct ColumnCollection<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> ColumnCollection<'a> {
    pub(crate) fn new(db: &'a Database, table: String) -> Self {
        Self { db, table }
    }

    /// Column names in ordinal order, freshly enumerated.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.db.reader().await?.column_names(&self.table).await
    }

    /// Look up a column by name. Returns `None` when no such column
    /// exists.
    pub async fn get(&self, name: &str) -> Result<Option<Column<'a>>> {
        validate::identifier(name, "columnName", self.db.max_identifier_length())?;

        let dialect = self.db.dialect();
        let names = self.db.reader().await?.column_names(&self.table).await?;
        Ok(names
            .into_iter()
            .find(|candidate| dialect.identifiers_equal(candidate, name))
            .map(|name| Column {
                db: self.db,
                table: self.table.clone(),
                name,
            }))
    }

    /// Add a column.
    ///
    /// A non-nullable column without a default cannot be added to a
    /// table that already contains rows; use
    /// [`add_with_default`](Self::add_with_default) for that case.
    pub async fn add(&self, column: ColumnDef) -> Result<()> {
        self.validate_def(&column)?;

        if !column.nullable && column.default.is_none() {
            let rows = self.row_count().await?;
            if rows > 0 {
                return Err(SchemaError::Validation(format!(
                    "column: cannot add non-nullable column \"{}\" to table \"{}\" with {} existing rows without a default value",
                    column.name, self.table, rows
                )));
            }
        }

        tracing::debug!(table = %self.table, column = %column.name, "adding column");
        let sql = self.db.ddl().add_column(&self.table, &column)?;
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Add a column and populate existing rows with the supplied value
    /// in one logical operation. The value arrives as a creation-time
    /// default and the implicit default is dropped afterwards where the
    /// engine allows it.
    pub async fn add_with_default(&self, column: ColumnDef, default: Value) -> Result<()> {
        self.validate_def(&column)?;

        // The supplied value is the creation-time default; a declared
        // default on the definition would collide with it.
        let mut column = column;
        column.default = None;

        tracing::debug!(table = %self.table, column = %column.name, "adding column with default for existing rows");
        let statements = self
            .db
            .ddl()
            .add_column_with_default(&self.table, &column, &default)?;
        self.db.execute_all(&statements).await?;
        Ok(())
    }

    /// Alter an existing column's type and nullability.
    ///
    /// Turning a column with NULLs non-nullable is not migrated
    /// implicitly: the engine's constraint violation propagates.
    /// Backfill first via [`RowCollection::set_value`](crate::RowCollection::set_value).
    pub async fn change(&self, column: ColumnDef) -> Result<()> {
        self.validate_def(&column)?;

        tracing::debug!(table = %self.table, column = %column.name, "changing column");
        let statements = self.db.ddl().change_column(&self.table, &column)?;
        self.db.execute_all(&statements).await?;
        Ok(())
    }

    /// Rename a column in place.
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let limit = self.db.max_identifier_length();
        validate::identifier(name, "columnName", limit)?;
        validate::identifier(new_name, "newColumnName", limit)?;

        tracing::debug!(table = %self.table, column = %name, new_column = %new_name, "renaming column");
        let sql = self.db.ddl().rename_column(&self.table, name, new_name);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop a column. Dropping a name that does not exist fails.
    pub async fn remove(&self, name: &str) -> Result<()> {
        validate::identifier(name, "columnName", self.db.max_identifier_length())?;

        tracing::debug!(table = %self.table, column = %name, "removing column");
        let sql = self.db.ddl().remove_column(&self.table, name);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    fn validate_def(&self, column: &ColumnDef) -> Result<()> {
        validate::identifier(&column.name, "column.name", self.db.max_identifier_length())?;
        if column.primary_key {
            return Err(SchemaError::Validation(
                "column.primary_key: primary keys are managed through the primary_key() handle"
                    .into(),
            ));
        }
        Ok(())
    }

    async fn row_count(&self) -> Result<i64> {
        let sql = self.db.dml().count(&self.table);
        let result = self.db.query(&sql, &[]).await?;
        Ok(result.scalar().and_then(|v| v.as_i64()).unwrap_or(0))
    }
}

/// A reflected column handle. The attributes are derived live from the
/// metadata surface on every call, never cached.
pub struct Column<'a> {
    db: &'a Database,
    table: String,
    name: String,
}

impl Column<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn nullable(&self) -> Result<bool> {
        self.db
            .reader()
            .await?
            .column_nullable(&self.table, &self.name)
            .await
    }

    /// The engine-reported SQL type string.
    pub async fn data_type(&self) -> Result<String> {
        self.db
            .reader()
            .await?
            .column_data_type(&self.table, &self.name)
            .await
    }

    pub async fn auto_increment(&self) -> Result<bool> {
        self.db
            .reader()
            .await?
            .column_auto_increment(&self.table, &self.name)
            .await
    }
}
