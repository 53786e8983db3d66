//! MySQL schema reflection via information_schema
//!
//! All queries are scoped to `DATABASE()`, the database selected by the
//! connection, and take their identifiers as bound parameters.

use crate::MySqlConnection;
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
impl SchemaReader for MySqlConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT TABLE_NAME FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
                 ORDER BY TABLE_NAME",
                &[],
            )
            .await?;
        Ok(names(result))
    }

    async fn table_schema(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT TABLE_SCHEMA FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
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
                "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
                 ORDER BY ORDINAL_POSITION",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn column_nullable(&self, table: &str, column: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT IS_NULLABLE FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
                &string_params(table, column),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_str())
            .map(|nullable| nullable == "YES")
            .ok_or_else(|| {
                SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
            })
    }

    async fn column_data_type(&self, table: &str, column: &str) -> Result<String> {
        let result = self
            .query(
                "SELECT DATA_TYPE FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
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
                "SELECT EXTRA FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
                &string_params(table, column),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_str())
            .map(|extra| extra.contains("auto_increment"))
            .ok_or_else(|| {
                SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
            })
    }

    async fn primary_key_name(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT CONSTRAINT_NAME FROM information_schema.TABLE_CONSTRAINTS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
                   AND CONSTRAINT_TYPE = 'PRIMARY KEY'",
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
                "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ? \
                 ORDER BY ORDINAL_POSITION",
                &string_params(table, primary_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT CONSTRAINT_NAME FROM information_schema.TABLE_CONSTRAINTS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
                   AND CONSTRAINT_TYPE = 'FOREIGN KEY' \
                 ORDER BY CONSTRAINT_NAME",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_columns(&self, table: &str, foreign_key: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ? \
                   AND REFERENCED_TABLE_NAME IS NOT NULL \
                 ORDER BY ORDINAL_POSITION",
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
                "SELECT REFERENCED_TABLE_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ? \
                   AND REFERENCED_TABLE_NAME IS NOT NULL \
                 LIMIT 1",
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
                "SELECT REFERENCED_COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ? \
                   AND REFERENCED_TABLE_NAME IS NOT NULL \
                 ORDER BY ORDINAL_POSITION",
                &string_params(table, foreign_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT DISTINCT INDEX_NAME FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME <> 'PRIMARY' \
                 ORDER BY INDEX_NAME",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_unique(&self, table: &str, index: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT NON_UNIQUE FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ? \
                 LIMIT 1",
                &string_params(table, index),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_i64())
            .map(|non_unique| non_unique == 0)
            .ok_or_else(|| {
                SchemaError::NotFound(format!("index \"{}\" on table \"{}\"", index, table))
            })
    }

    async fn index_columns(&self, table: &str, index: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT COLUMN_NAME FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ? \
                 ORDER BY SEQ_IN_INDEX",
                &string_params(table, index),
            )
            .await?;
        Ok(names(result))
    }
}
