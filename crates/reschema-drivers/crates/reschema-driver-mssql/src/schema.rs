//! MS SQL Server schema reflection via the sys catalog
//!
//! Scoped to the dbo schema of the connected database. Identifier
//! arguments travel as @Pn parameters.

use crate::MssqlConnection;
use async_trait::async_trait;
use reschema_core::{Connection, Result, SchemaError, SchemaReader, Value};

fn string_param(value: &str) -> Vec<Value> {
    vec![Value::String(value.to_string())]
}

fn string_params(a: &str, b: &str) -> Vec<Value> {
    vec![Value::String(a.to_string()), Value::String(b.to_string())]
}

fn names(result: reschema_core::QueryResult) -> Vec<String> {
    result
        .rows
        .iter()
        .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[async_trait]
impl SchemaReader for MssqlConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT t.name FROM sys.tables t \
                 INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 WHERE s.name = 'dbo' AND t.type = 'U' \
                 ORDER BY t.name",
                &[],
            )
            .await?;
        Ok(names(result))
    }

    async fn table_schema(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT s.name FROM sys.tables t \
                 INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 WHERE t.name = @P1",
                &string_param(table),
            )
            .await?;
        Ok(result
            .scalar()
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT c.name FROM sys.columns c \
                 INNER JOIN sys.tables t ON c.object_id = t.object_id \
                 WHERE t.name = @P1 \
                 ORDER BY c.column_id",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn column_nullable(&self, table: &str, column: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT c.is_nullable FROM sys.columns c \
                 INNER JOIN sys.tables t ON c.object_id = t.object_id \
                 WHERE t.name = @P1 AND c.name = @P2",
                &string_params(table, column),
            )
            .await?;
        result.scalar().and_then(|v| v.as_bool()).ok_or_else(|| {
            SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
        })
    }

    async fn column_data_type(&self, table: &str, column: &str) -> Result<String> {
        let result = self
            .query(
                "SELECT TYPE_NAME(c.user_type_id) FROM sys.columns c \
                 INNER JOIN sys.tables t ON c.object_id = t.object_id \
                 WHERE t.name = @P1 AND c.name = @P2",
                &string_params(table, column),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
            })
    }

    async fn column_auto_increment(&self, table: &str, column: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT c.is_identity FROM sys.columns c \
                 INNER JOIN sys.tables t ON c.object_id = t.object_id \
                 WHERE t.name = @P1 AND c.name = @P2",
                &string_params(table, column),
            )
            .await?;
        result.scalar().and_then(|v| v.as_bool()).ok_or_else(|| {
            SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
        })
    }

    async fn primary_key_name(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT kc.name FROM sys.key_constraints kc \
                 INNER JOIN sys.tables t ON kc.parent_object_id = t.object_id \
                 WHERE t.name = @P1 AND kc.type = 'PK'",
                &string_param(table),
            )
            .await?;
        Ok(result
            .scalar()
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    async fn primary_key_columns(&self, table: &str, primary_key: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT col.name FROM sys.key_constraints kc \
                 INNER JOIN sys.tables t ON kc.parent_object_id = t.object_id \
                 INNER JOIN sys.index_columns ic \
                    ON ic.object_id = t.object_id AND ic.index_id = kc.unique_index_id \
                 INNER JOIN sys.columns col \
                    ON col.object_id = t.object_id AND col.column_id = ic.column_id \
                 WHERE t.name = @P1 AND kc.name = @P2 \
                 ORDER BY ic.key_ordinal",
                &string_params(table, primary_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT fk.name FROM sys.foreign_keys fk \
                 INNER JOIN sys.tables t ON fk.parent_object_id = t.object_id \
                 WHERE t.name = @P1 \
                 ORDER BY fk.name",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_columns(&self, table: &str, foreign_key: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT pc.name FROM sys.foreign_keys fk \
                 INNER JOIN sys.tables t ON t.object_id = fk.parent_object_id \
                 INNER JOIN sys.foreign_key_columns fkc \
                    ON fkc.constraint_object_id = fk.object_id \
                 INNER JOIN sys.columns pc \
                    ON pc.object_id = fkc.parent_object_id AND pc.column_id = fkc.parent_column_id \
                 WHERE t.name = @P1 AND fk.name = @P2 \
                 ORDER BY fkc.constraint_column_id",
                &string_params(table, foreign_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_referenced_table(
        &self,
        table: &str,
        foreign_key: &str,
    ) -> Result<String> {
        let result = self
            .query(
                "SELECT rt.name FROM sys.foreign_keys fk \
                 INNER JOIN sys.tables t ON t.object_id = fk.parent_object_id \
                 INNER JOIN sys.tables rt ON rt.object_id = fk.referenced_object_id \
                 WHERE t.name = @P1 AND fk.name = @P2",
                &string_params(table, foreign_key),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                SchemaError::NotFound(format!(
                    "foreign key \"{}\" on table \"{}\"",
                    foreign_key, table
                ))
            })
    }

    async fn foreign_key_referenced_columns(
        &self,
        table: &str,
        foreign_key: &str,
    ) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT rc.name FROM sys.foreign_keys fk \
                 INNER JOIN sys.tables t ON t.object_id = fk.parent_object_id \
                 INNER JOIN sys.foreign_key_columns fkc \
                    ON fkc.constraint_object_id = fk.object_id \
                 INNER JOIN sys.columns rc \
                    ON rc.object_id = fkc.referenced_object_id \
                   AND rc.column_id = fkc.referenced_column_id \
                 WHERE t.name = @P1 AND fk.name = @P2 \
                 ORDER BY fkc.constraint_column_id",
                &string_params(table, foreign_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT i.name FROM sys.indexes i \
                 INNER JOIN sys.tables t ON i.object_id = t.object_id \
                 WHERE t.name = @P1 AND i.index_id > 0 AND i.name IS NOT NULL \
                   AND i.is_primary_key = 0 AND i.is_unique_constraint = 0 \
                 ORDER BY i.name",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_unique(&self, table: &str, index: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT i.is_unique FROM sys.indexes i \
                 INNER JOIN sys.tables t ON i.object_id = t.object_id \
                 WHERE t.name = @P1 AND i.name = @P2",
                &string_params(table, index),
            )
            .await?;
        result.scalar().and_then(|v| v.as_bool()).ok_or_else(|| {
            SchemaError::NotFound(format!("index \"{}\" on table \"{}\"", index, table))
        })
    }

    async fn index_columns(&self, table: &str, index: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT c.name FROM sys.indexes i \
                 INNER JOIN sys.tables t ON i.object_id = t.object_id \
                 INNER JOIN sys.index_columns ic \
                    ON ic.object_id = t.object_id AND ic.index_id = i.index_id \
                 INNER JOIN sys.columns c \
                    ON c.object_id = t.object_id AND c.column_id = ic.column_id \
                 WHERE t.name = @P1 AND i.name = @P2 AND ic.is_included_column = 0 \
                 ORDER BY ic.key_ordinal",
                &string_params(table, index),
            )
            .await?;
        Ok(names(result))
    }
}
