//! Schema reflection surface and definition builders

use crate::{DataType, Result, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read-only metadata surface, one method per dimension.
///
/// Every call issues a fresh query against the engine's catalog; nothing
/// is cached, so results always reflect schema changes made through other
/// sessions. Methods returning collections return empty vectors when
/// nothing matches; the only optional scalar is the primary-key name.
/// Ordered dimensions (key/index/foreign-key column lists) preserve the
/// engine's ordinal positions exactly.
#[async_trait]
pub trait SchemaReader: Send + Sync {
    /// Names of all user tables in the current database/schema scope.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Schema the table lives in, where the engine has schemas.
    async fn table_schema(&self, table: &str) -> Result<Option<String>>;

    /// Column names of a table in ordinal order.
    async fn column_names(&self, table: &str) -> Result<Vec<String>>;

    async fn column_nullable(&self, table: &str, column: &str) -> Result<bool>;

    /// Engine-reported SQL type string for the column.
    async fn column_data_type(&self, table: &str, column: &str) -> Result<String>;

    async fn column_auto_increment(&self, table: &str, column: &str) -> Result<bool>;

    /// Name of the table's primary key constraint, if one exists.
    async fn primary_key_name(&self, table: &str) -> Result<Option<String>>;

    /// Ordered columns of the named primary key.
    async fn primary_key_columns(&self, table: &str, primary_key: &str) -> Result<Vec<String>>;

    async fn foreign_key_names(&self, table: &str) -> Result<Vec<String>>;

    /// Ordered local columns of the named foreign key.
    async fn foreign_key_columns(&self, table: &str, foreign_key: &str) -> Result<Vec<String>>;

    async fn foreign_key_referenced_table(&self, table: &str, foreign_key: &str)
    -> Result<String>;

    /// Ordered referenced columns, positionally matching
    /// [`foreign_key_columns`](Self::foreign_key_columns).
    async fn foreign_key_referenced_columns(
        &self,
        table: &str,
        foreign_key: &str,
    ) -> Result<Vec<String>>;

    async fn index_names(&self, table: &str) -> Result<Vec<String>>;

    async fn index_unique(&self, table: &str, index: &str) -> Result<bool>;

    /// Ordered key columns of the named index. An empty result means the
    /// index does not exist.
    async fn index_columns(&self, table: &str, index: &str) -> Result<Vec<String>>;
}

/// Column definition used when creating tables or adding columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    /// Defaults to NOT NULL; see [`nullable`](Self::nullable).
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Default expression applied at creation time.
    pub default: Option<Value>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Index definition. The name defaults to the database's naming
/// convention when not supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub columns: Vec<String>,
    pub unique: bool,
    pub name: Option<String>,
    /// Non-key covering columns, on engines that support them.
    pub include_columns: Vec<String>,
}

impl IndexDef {
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            name: None,
            include_columns: Vec::new(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn include<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Foreign key definition. Local and referenced columns correspond
/// positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub name: Option<String>,
}

impl ForeignKeyDef {
    pub fn new<I, S>(columns: I, referenced_table: impl Into<String>, referenced_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Reflected column metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub auto_increment: bool,
}

/// Reflected index metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Reflected foreign key metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// Reflected primary key metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    pub name: String,
    pub columns: Vec<String>,
}
