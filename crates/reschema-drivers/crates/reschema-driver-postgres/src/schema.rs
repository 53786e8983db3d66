//! PostgreSQL schema reflection
//!
//! Column, key and constraint dimensions come from information_schema;
//! index dimensions need pg_catalog because information_schema has no
//! ordered index-column view. Everything is scoped to the current
//! database and the public schema.

use crate::PostgresConnection;
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
impl SchemaReader for PostgresConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[],
            )
            .await?;
        Ok(names(result))
    }

    async fn table_schema(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT table_schema FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_name = $1",
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
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 \
                 ORDER BY ordinal_position",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn column_nullable(&self, table: &str, column: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT is_nullable FROM information_schema.columns \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND column_name = $2",
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
                "SELECT data_type FROM information_schema.columns \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND column_name = $2",
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
                "SELECT column_default, is_identity FROM information_schema.columns \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND column_name = $2",
                &string_params(table, column),
            )
            .await?;
        let row = result.rows.first().ok_or_else(|| {
            SchemaError::NotFound(format!("column \"{}\" in table \"{}\"", column, table))
        })?;

        let serial_default = row
            .get(0)
            .and_then(|v| v.as_str())
            .map(|default| default.starts_with("nextval("))
            .unwrap_or(false);
        let identity = row.get(1).and_then(|v| v.as_str()) == Some("YES");

        Ok(serial_default || identity)
    }

    async fn primary_key_name(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT constraint_name FROM information_schema.table_constraints \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND constraint_type = 'PRIMARY KEY'",
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
                "SELECT column_name FROM information_schema.key_column_usage \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND constraint_name = $2 \
                 ORDER BY ordinal_position",
                &string_params(table, primary_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT constraint_name FROM information_schema.table_constraints \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND constraint_type = 'FOREIGN KEY' \
                 ORDER BY constraint_name",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn foreign_key_columns(&self, table: &str, foreign_key: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT column_name FROM information_schema.key_column_usage \
                 WHERE table_catalog = current_database() AND table_schema = 'public' \
                   AND table_name = $1 AND constraint_name = $2 \
                 ORDER BY ordinal_position",
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
                "SELECT ccu.table_name \
                 FROM information_schema.constraint_column_usage ccu \
                 WHERE ccu.constraint_catalog = current_database() \
                   AND ccu.constraint_name = $1 \
                 LIMIT 1",
                &string_param(foreign_key),
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
        _table: &str,
        foreign_key: &str,
    ) -> Result<Vec<String>> {
        // Join through referential_constraints so the referenced columns
        // come back in the order matching the local columns.
        let result = self
            .query(
                "SELECT kcu_ref.column_name \
                 FROM information_schema.key_column_usage kcu \
                 JOIN information_schema.referential_constraints rc \
                   ON rc.constraint_name = kcu.constraint_name \
                  AND rc.constraint_catalog = kcu.constraint_catalog \
                 JOIN information_schema.key_column_usage kcu_ref \
                   ON kcu_ref.constraint_name = rc.unique_constraint_name \
                  AND kcu_ref.ordinal_position = kcu.position_in_unique_constraint \
                 WHERE kcu.constraint_catalog = current_database() \
                   AND kcu.constraint_name = $1 \
                 ORDER BY kcu.ordinal_position",
                &string_param(foreign_key),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT c.relname \
                 FROM pg_class t \
                 JOIN pg_index ix ON ix.indrelid = t.oid \
                 JOIN pg_class c ON c.oid = ix.indexrelid \
                 JOIN pg_namespace n ON n.oid = t.relnamespace \
                 WHERE n.nspname = 'public' AND t.relname = $1 AND NOT ix.indisprimary \
                 ORDER BY c.relname",
                &string_param(table),
            )
            .await?;
        Ok(names(result))
    }

    async fn index_unique(&self, table: &str, index: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT ix.indisunique \
                 FROM pg_class t \
                 JOIN pg_index ix ON ix.indrelid = t.oid \
                 JOIN pg_class c ON c.oid = ix.indexrelid \
                 JOIN pg_namespace n ON n.oid = t.relnamespace \
                 WHERE n.nspname = 'public' AND t.relname = $1 AND c.relname = $2",
                &string_params(table, index),
            )
            .await?;
        result
            .scalar()
            .and_then(|v| v.as_bool())
            .ok_or_else(|| {
                SchemaError::NotFound(format!("index \"{}\" on table \"{}\"", index, table))
            })
    }

    async fn index_columns(&self, table: &str, index: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT a.attname \
                 FROM pg_class t \
                 JOIN pg_index ix ON ix.indrelid = t.oid \
                 JOIN pg_class c ON c.oid = ix.indexrelid \
                 JOIN pg_namespace n ON n.oid = t.relnamespace \
                 JOIN unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON TRUE \
                 JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
                 WHERE n.nspname = 'public' AND t.relname = $1 AND c.relname = $2 \
                 ORDER BY k.ord",
                &string_params(table, index),
            )
            .await?;
        Ok(names(result))
    }
}
