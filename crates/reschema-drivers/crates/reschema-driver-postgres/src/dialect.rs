//! PostgreSQL SQL dialect

use reschema_core::{
    AutoIncrement, ChangeColumnStyle, DataType, Result, SqlDialect, SqlStatement, Value,
};

/// PostgreSQL dialect. Auto-increment is expressed by substituting the
/// SERIAL pseudo-types; everything else follows the ANSI defaults.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn max_identifier_length(&self) -> usize {
        63
    }

    fn sql_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Blob => "BYTEA".into(),
            DataType::Uuid => "UUID".into(),
            DataType::NVarChar(len) => format!("VARCHAR({})", len),
            DataType::DateTime => "TIMESTAMP".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Integer => "INT".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Real => "REAL".into(),
            DataType::Double => "DOUBLE PRECISION".into(),
            DataType::Decimal(precision, scale) => format!("DECIMAL({}, {})", precision, scale),
            DataType::Char(len) => format!("CHAR({})", len),
            DataType::VarChar(len) => format!("VARCHAR({})", len),
            DataType::Text => "TEXT".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
        }
    }

    fn auto_increment(&self) -> AutoIncrement {
        AutoIncrement::TypeSubstitution
    }

    fn auto_increment_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::SmallInt => "SMALLSERIAL".into(),
            DataType::BigInt => "BIGSERIAL".into(),
            _ => "SERIAL".into(),
        }
    }

    fn unicode_text_type(&self) -> &'static str {
        "VARCHAR"
    }

    fn datetime_type(&self) -> &'static str {
        "TIMESTAMP"
    }

    fn change_column_style(&self) -> ChangeColumnStyle {
        ChangeColumnStyle::TypeAndNullability
    }

    fn identity_query(&self, table: &str, column: &str) -> Result<String> {
        // Identifiers are always created quoted, so the sequence lookup
        // must see them quoted too.
        Ok(format!(
            "SELECT currval(pg_get_serial_sequence('\"{}\"', '{}'))",
            table.replace('\'', "''"),
            column.replace('\'', "''")
        ))
    }

    fn database_exists_query(&self, name: &str) -> Result<SqlStatement> {
        Ok(SqlStatement::with_params(
            "SELECT 1 FROM pg_database WHERE datname = $1",
            vec![Value::String(name.to_string())],
        ))
    }
}
