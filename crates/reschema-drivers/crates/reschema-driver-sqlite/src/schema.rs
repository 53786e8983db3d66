//! SQLite schema reflection via PRAGMA queries
//!
//! PRAGMA functions cannot take bound parameters, so table and index
//! names are embedded with single quotes doubled. SQLite exposes no
//! constraint names through the pragma surface: primary keys and foreign
//! keys get synthesized stable names (`PK_<table>`, `FK_<table>_<id>`).

use crate::SqliteConnection;
use async_trait::async_trait;
use reschema_core::{Connection, Result, SchemaError, SchemaReader};

fn pragma_arg(name: &str) -> String {
    name.replace('\'', "''")
}

/// Recover the pragma group id from a synthesized foreign key name.
fn foreign_key_id(name: &str) -> Option<i64> {
    name.rsplit('_').next().and_then(|id| id.parse().ok())
}

#[async_trait]
impl SchemaReader for SqliteConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                &[],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    async fn table_schema(&self, _table: &str) -> Result<Option<String>> {
        Ok(Some("main".to_string()))
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(1).and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    async fn column_nullable(&self, table: &str, column: &str) -> Result<bool> {
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        for row in &result.rows {
            if row.get(1).and_then(|v| v.as_str()) == Some(column) {
                return Ok(row.get(3).and_then(|v| v.as_i64()) == Some(0));
            }
        }
        Err(SchemaError::NotFound(format!(
            "column \"{}\" in table \"{}\"",
            column, table
        )))
    }

    async fn column_data_type(&self, table: &str, column: &str) -> Result<String> {
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        for row in &result.rows {
            if row.get(1).and_then(|v| v.as_str()) == Some(column) {
                return Ok(row
                    .get(2)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string());
            }
        }
        Err(SchemaError::NotFound(format!(
            "column \"{}\" in table \"{}\"",
            column, table
        )))
    }

    async fn column_auto_increment(&self, table: &str, column: &str) -> Result<bool> {
        // A rowid alias: INTEGER column that is (part of) the primary key.
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        for row in &result.rows {
            if row.get(1).and_then(|v| v.as_str()) == Some(column) {
                let data_type = row.get(2).and_then(|v| v.as_str()).unwrap_or_default();
                let is_pk = row.get(5).and_then(|v| v.as_i64()).unwrap_or(0) > 0;
                return Ok(is_pk && data_type.eq_ignore_ascii_case("INTEGER"));
            }
        }
        Err(SchemaError::NotFound(format!(
            "column \"{}\" in table \"{}\"",
            column, table
        )))
    }

    async fn primary_key_name(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        let has_primary_key = result
            .rows
            .iter()
            .any(|row| row.get(5).and_then(|v| v.as_i64()).unwrap_or(0) > 0);

        Ok(has_primary_key.then(|| format!("PK_{}", table)))
    }

    async fn primary_key_columns(&self, table: &str, _primary_key: &str) -> Result<Vec<String>> {
        let result = self
            .query(&format!("PRAGMA table_info('{}')", pragma_arg(table)), &[])
            .await?;

        // The pk column of table_info is the 1-based position within the key.
        let mut columns: Vec<(i64, String)> = result
            .rows
            .iter()
            .filter_map(|row| {
                let position = row.get(5).and_then(|v| v.as_i64()).unwrap_or(0);
                if position > 0 {
                    row.get(1)
                        .and_then(|v| v.as_str())
                        .map(|name| (position, name.to_string()))
                } else {
                    None
                }
            })
            .collect();
        columns.sort_by_key(|(position, _)| *position);

        Ok(columns.into_iter().map(|(_, name)| name).collect())
    }

    async fn foreign_key_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(
                &format!("PRAGMA foreign_key_list('{}')", pragma_arg(table)),
                &[],
            )
            .await?;

        let mut ids: Vec<i64> = result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_i64()))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        Ok(ids
            .into_iter()
            .map(|id| format!("FK_{}_{}", table, id))
            .collect())
    }

    async fn foreign_key_columns(&self, table: &str, foreign_key: &str) -> Result<Vec<String>> {
        let Some(id) = foreign_key_id(foreign_key) else {
            return Ok(Vec::new());
        };
        let result = self
            .query(
                &format!("PRAGMA foreign_key_list('{}')", pragma_arg(table)),
                &[],
            )
            .await?;

        let mut columns: Vec<(i64, String)> = result
            .rows
            .iter()
            .filter(|row| row.get(0).and_then(|v| v.as_i64()) == Some(id))
            .filter_map(|row| {
                let seq = row.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
                row.get(3)
                    .and_then(|v| v.as_str())
                    .map(|name| (seq, name.to_string()))
            })
            .collect();
        columns.sort_by_key(|(seq, _)| *seq);

        Ok(columns.into_iter().map(|(_, name)| name).collect())
    }

    async fn foreign_key_referenced_table(
        &self,
        table: &str,
        foreign_key: &str,
    ) -> Result<String> {
        let id = foreign_key_id(foreign_key).ok_or_else(|| {
            SchemaError::NotFound(format!(
                "foreign key \"{}\" on table \"{}\"",
                foreign_key, table
            ))
        })?;
        let result = self
            .query(
                &format!("PRAGMA foreign_key_list('{}')", pragma_arg(table)),
                &[],
            )
            .await?;

        result
            .rows
            .iter()
            .find(|row| row.get(0).and_then(|v| v.as_i64()) == Some(id))
            .and_then(|row| row.get(2).and_then(|v| v.as_str()).map(str::to_string))
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
        let Some(id) = foreign_key_id(foreign_key) else {
            return Ok(Vec::new());
        };
        let result = self
            .query(
                &format!("PRAGMA foreign_key_list('{}')", pragma_arg(table)),
                &[],
            )
            .await?;

        let mut columns: Vec<(i64, String)> = result
            .rows
            .iter()
            .filter(|row| row.get(0).and_then(|v| v.as_i64()) == Some(id))
            .filter_map(|row| {
                let seq = row.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
                row.get(4)
                    .and_then(|v| v.as_str())
                    .map(|name| (seq, name.to_string()))
            })
            .collect();
        columns.sort_by_key(|(seq, _)| *seq);

        Ok(columns.into_iter().map(|(_, name)| name).collect())
    }

    async fn index_names(&self, table: &str) -> Result<Vec<String>> {
        let result = self
            .query(&format!("PRAGMA index_list('{}')", pragma_arg(table)), &[])
            .await?;

        Ok(result
            .rows
            .iter()
            .filter(|row| {
                // Skip the implicit primary-key index and the internal
                // indexes backing UNIQUE constraints.
                row.get(3).and_then(|v| v.as_str()) != Some("pk")
            })
            .filter_map(|row| row.get(1).and_then(|v| v.as_str()).map(str::to_string))
            .filter(|name| !name.starts_with("sqlite_autoindex"))
            .collect())
    }

    async fn index_unique(&self, table: &str, index: &str) -> Result<bool> {
        let result = self
            .query(&format!("PRAGMA index_list('{}')", pragma_arg(table)), &[])
            .await?;

        result
            .rows
            .iter()
            .find(|row| row.get(1).and_then(|v| v.as_str()) == Some(index))
            .map(|row| row.get(2).and_then(|v| v.as_i64()) == Some(1))
            .ok_or_else(|| {
                SchemaError::NotFound(format!("index \"{}\" on table \"{}\"", index, table))
            })
    }

    async fn index_columns(&self, _table: &str, index: &str) -> Result<Vec<String>> {
        let result = self
            .query(&format!("PRAGMA index_info('{}')", pragma_arg(index)), &[])
            .await?;

        let mut columns: Vec<(i64, String)> = result
            .rows
            .iter()
            .filter_map(|row| {
                let seq = row.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
                row.get(2)
                    .and_then(|v| v.as_str())
                    .map(|name| (seq, name.to_string()))
            })
            .collect();
        columns.sort_by_key(|(seq, _)| *seq);

        Ok(columns.into_iter().map(|(_, name)| name).collect())
    }
}
