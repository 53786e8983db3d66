//! Row-level access
//!
//! The minimal DML surface schema changes need: insert/update/delete of
//! named-value tuples, the single-column backfill, the row-count read
//! path and identity retrieval. Values always travel as bound
//! parameters.

use crate::Database;
use reschema_core::{Result, SchemaError, Value, validate};

/// Row access for one table.
pub struct RowCollection<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> RowCollection<'a> {
    pub(crate) fn new(db: &'a Database, table: String) -> Self {
        Self { db, table }
    }

    /// Insert one row of named values.
    pub async fn add(&self, values: &[(String, Value)]) -> Result<()> {
        validate::non_empty_slice(values, "values")?;

        let statement = self.db.dml().insert(&self.table, values);
        self.db.execute(&statement.sql, &statement.params).await?;
        Ok(())
    }

    /// Update the SET values on rows matching all WHERE values. An empty
    /// WHERE list updates every row. Returns the affected row count.
    pub async fn update(
        &self,
        set: &[(String, Value)],
        filter: &[(String, Value)],
    ) -> Result<u64> {
        validate::non_empty_slice(set, "set")?;

        let statement = self.db.dml().update(&self.table, set, filter);
        let result = self.db.execute(&statement.sql, &statement.params).await?;
        Ok(result.affected_rows)
    }

    /// Delete rows matching all WHERE values. An empty WHERE list
    /// deletes every row. Returns the affected row count.
    pub async fn delete(&self, filter: &[(String, Value)]) -> Result<u64> {
        let statement = self.db.dml().delete(&self.table, filter);
        let result = self.db.execute(&statement.sql, &statement.params).await?;
        Ok(result.affected_rows)
    }

    /// Set one column to the given value on every row (the backfill used
    /// around schema changes).
    pub async fn set_value(&self, column: &str, value: Value) -> Result<u64> {
        validate::identifier(column, "columnName", self.db.max_identifier_length())?;

        let statement = self.db.dml().set_column_value(&self.table, column, value);
        let result = self.db.execute(&statement.sql, &statement.params).await?;
        Ok(result.affected_rows)
    }

    /// Number of rows in the table.
    pub async fn count(&self) -> Result<i64> {
        let sql = self.db.dml().count(&self.table);
        let result = self.db.query(&sql, &[]).await?;
        result
            .scalar()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| SchemaError::Execution("row count query returned no value".into()))
    }

    /// Identity value generated by the most recent insert on this
    /// connection.
    pub async fn last_identity(&self, column: &str) -> Result<Value> {
        validate::identifier(column, "columnName", self.db.max_identifier_length())?;

        let sql = self.db.dml().last_identity(&self.table, column)?;
        let result = self.db.query(&sql, &[]).await?;
        result
            .scalar()
            .cloned()
            .ok_or_else(|| SchemaError::Execution("identity query returned no value".into()))
    }
}
