//! SQL dialect capability surface
//!
//! Each engine provides one [`SqlDialect`] implementation describing its
//! quoting rules, identifier limits, type names and statement shapes. The
//! DDL/DML generators consume these capabilities and never branch on a
//! concrete engine.

use crate::{DataType, Result, SchemaError, SqlStatement, Value};

/// How an engine expresses an auto-incrementing column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    /// A keyword appended to the column definition
    /// (`AUTO_INCREMENT`, `AUTOINCREMENT`, `IDENTITY(1,1)`).
    Keyword(&'static str),
    /// The column type itself is substituted
    /// (PostgreSQL `SERIAL` / `BIGSERIAL`).
    TypeSubstitution,
}

/// How an engine renames tables and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStyle {
    /// `ALTER TABLE … RENAME [COLUMN] … TO …`
    AlterRename,
    /// `EXEC sp_rename '…', '…'`
    StoredProcedure,
}

/// How an engine alters an existing column's type/nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeColumnStyle {
    /// One `ALTER COLUMN <definition>` statement re-stating the column.
    AlterColumn,
    /// `MODIFY COLUMN <definition>` re-stating the column.
    ModifyColumn,
    /// Separate `ALTER COLUMN … TYPE …` and `SET/DROP NOT NULL` statements.
    TypeAndNullability,
    /// The engine cannot alter columns in place.
    Unsupported,
}

/// How an engine drops a primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPrimaryKeyStyle {
    /// `ALTER TABLE … DROP CONSTRAINT <name>`
    DropConstraint,
    /// `ALTER TABLE … DROP PRIMARY KEY`
    DropPrimaryKey,
    /// The engine cannot mutate primary keys in place.
    Unsupported,
}

/// How an engine drops a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropForeignKeyStyle {
    /// `ALTER TABLE … DROP CONSTRAINT <name>`
    DropConstraint,
    /// `ALTER TABLE … DROP FOREIGN KEY <name>`
    DropForeignKey,
    /// Foreign keys exist only from table creation time.
    Unsupported,
}

/// How an engine drops an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIndexStyle {
    /// `DROP INDEX <name>`
    Plain,
    /// `DROP INDEX <name> ON <table>`
    OnTable,
}

/// How the implicit default added by a populate-existing-rows column add
/// is removed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDefaultStyle {
    /// `ALTER TABLE … ALTER COLUMN … DROP DEFAULT`
    AlterColumn,
    /// A named default constraint is created and dropped
    /// (`DF_<table>_<column>`).
    NamedConstraint,
    /// The engine cannot drop the default; it is retained.
    Retain,
}

/// Per-engine SQL dialect: quoting, limits, type mapping and the
/// statement-shape capabilities the generators select on.
pub trait SqlDialect: Send + Sync {
    /// Dialect identifier (e.g. "sqlite", "postgres")
    fn name(&self) -> &'static str;

    /// Identifier quote character
    fn quote_char(&self) -> char {
        '"'
    }

    /// Escape a single identifier for inclusion in SQL text.
    ///
    /// Default wraps the identifier in the quote character, doubling any
    /// embedded quote characters.
    fn escape_identifier(&self, identifier: &str) -> String {
        let q = self.quote_char();
        let mut escaped = String::with_capacity(identifier.len() + 2);
        escaped.push(q);
        for ch in identifier.chars() {
            escaped.push(ch);
            if ch == q {
                escaped.push(q);
            }
        }
        escaped.push(q);
        escaped
    }

    /// Positional parameter placeholder for the 1-based index.
    fn placeholder(&self, index: usize) -> String;

    /// Maximum identifier length accepted by the engine.
    fn max_identifier_length(&self) -> usize;

    /// Map a semantic data type to the engine's SQL type string.
    fn sql_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Boolean => "BOOLEAN".into(),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Integer => "INT".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Real => "REAL".into(),
            DataType::Double => "DOUBLE PRECISION".into(),
            DataType::Decimal(precision, scale) => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            DataType::Char(len) => format!("CHAR({})", len),
            DataType::VarChar(len) => format!("VARCHAR({})", len),
            DataType::NVarChar(len) => format!("{}({})", self.unicode_text_type(), len),
            DataType::Text => "TEXT".into(),
            DataType::Blob => "BLOB".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::DateTime => self.datetime_type().into(),
            DataType::Uuid => "CHAR(36)".into(),
        }
    }

    /// SQL type substituted for an auto-incrementing column when the
    /// dialect uses [`AutoIncrement::TypeSubstitution`].
    fn auto_increment_type(&self, data_type: &DataType) -> String {
        self.sql_type(data_type)
    }

    /// Render a value as a SQL literal. Used only inside DDL `DEFAULT`
    /// clauses; DML values are always bound parameters.
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".into(),
            Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.into(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float32(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::Decimal(v) => v.clone(),
            Value::String(v) => format!("'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{:02x}", b)).collect();
                format!("x'{}'", hex)
            }
            Value::Uuid(v) => format!("'{}'", v),
            Value::Date(v) => format!("'{}'", v),
            Value::Time(v) => format!("'{}'", v),
            Value::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
            Value::DateTimeUtc(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    /// Auto-increment expression style
    fn auto_increment(&self) -> AutoIncrement;

    /// SQL type name used for unicode text
    fn unicode_text_type(&self) -> &'static str {
        "NVARCHAR"
    }

    /// SQL type name used for date-time values
    fn datetime_type(&self) -> &'static str {
        "DATETIME"
    }

    /// Whether inserting into a table whose only supplied column is an
    /// auto-incrementing primary key requires an explicit NULL value.
    fn insert_null_for_auto_increment_primary_key(&self) -> bool {
        false
    }

    /// Compare two identifiers under the engine's casing rules.
    fn identifiers_equal(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Whether the primary key of an existing table can be added/removed
    /// through ALTER statements.
    fn supports_primary_key_alter(&self) -> bool {
        true
    }

    /// Whether foreign keys can be added/removed after table creation.
    fn supports_foreign_key_alter(&self) -> bool {
        true
    }

    /// Whether indexes may carry non-key INCLUDE columns.
    fn supports_include_columns(&self) -> bool {
        false
    }

    fn rename_style(&self) -> RenameStyle {
        RenameStyle::AlterRename
    }

    fn change_column_style(&self) -> ChangeColumnStyle;

    fn drop_primary_key_style(&self) -> DropPrimaryKeyStyle {
        DropPrimaryKeyStyle::DropConstraint
    }

    fn drop_foreign_key_style(&self) -> DropForeignKeyStyle {
        DropForeignKeyStyle::DropConstraint
    }

    fn drop_index_style(&self) -> DropIndexStyle {
        DropIndexStyle::Plain
    }

    fn drop_default_style(&self) -> DropDefaultStyle {
        DropDefaultStyle::AlterColumn
    }

    /// Query returning the identity value generated by the most recent
    /// insert on the current connection.
    fn identity_query(&self, table: &str, column: &str) -> Result<String>;

    /// Catalog probe: does the named database exist? Engines whose
    /// lifecycle is not catalog-driven leave this unsupported and handle
    /// existence at the driver level.
    fn database_exists_query(&self, name: &str) -> Result<SqlStatement> {
        let _ = name;
        Err(SchemaError::NotSupported(format!(
            "{} does not expose a database catalog probe",
            self.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AnsiDialect;

    impl SqlDialect for AnsiDialect {
        fn name(&self) -> &'static str {
            "ansi"
        }

        fn placeholder(&self, _index: usize) -> String {
            "?".into()
        }

        fn max_identifier_length(&self) -> usize {
            128
        }

        fn auto_increment(&self) -> AutoIncrement {
            AutoIncrement::Keyword("GENERATED ALWAYS AS IDENTITY")
        }

        fn change_column_style(&self) -> ChangeColumnStyle {
            ChangeColumnStyle::AlterColumn
        }

        fn identity_query(&self, _table: &str, _column: &str) -> Result<String> {
            Err(SchemaError::NotSupported("identity retrieval".into()))
        }
    }

    #[test]
    fn escape_doubles_embedded_quotes() {
        let dialect = AnsiDialect;
        assert_eq!(dialect.escape_identifier("plain"), "\"plain\"");
        assert_eq!(dialect.escape_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn string_literal_doubles_single_quotes() {
        let dialect = AnsiDialect;
        assert_eq!(
            dialect.literal(&Value::String("O'Brien".into())),
            "'O''Brien'"
        );
        assert_eq!(dialect.literal(&Value::Null), "NULL");
        assert_eq!(dialect.literal(&Value::Int32(7)), "7");
    }

    #[test]
    fn unicode_type_flows_through_sql_type() {
        let dialect = AnsiDialect;
        assert_eq!(dialect.sql_type(&DataType::NVarChar(50)), "NVARCHAR(50)");
        assert_eq!(dialect.sql_type(&DataType::DateTime), "DATETIME");
        assert_eq!(dialect.sql_type(&DataType::Decimal(10, 2)), "DECIMAL(10, 2)");
    }
}
