//! MS SQL Server SQL dialect

use reschema_core::{
    AutoIncrement, ChangeColumnStyle, DataType, DropDefaultStyle, DropIndexStyle, RenameStyle,
    Result, SqlDialect, SqlStatement, Value,
};

/// SQL Server dialect: bracket quoting, `@Pn` placeholders, IDENTITY
/// columns, `sp_rename` for renames and INCLUDE columns on indexes.
pub struct MssqlDialect;

impl SqlDialect for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn quote_char(&self) -> char {
        '['
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{}", index)
    }

    fn max_identifier_length(&self) -> usize {
        128
    }

    fn sql_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Boolean => "BIT".into(),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Integer => "INT".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Real => "REAL".into(),
            DataType::Double => "FLOAT".into(),
            DataType::Decimal(precision, scale) => format!("DECIMAL({}, {})", precision, scale),
            DataType::Char(len) => format!("CHAR({})", len),
            DataType::VarChar(len) => format!("VARCHAR({})", len),
            DataType::NVarChar(len) => format!("{}({})", self.unicode_text_type(), len),
            DataType::Text => "NVARCHAR(MAX)".into(),
            DataType::Blob => "VARBINARY(MAX)".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::DateTime => self.datetime_type().into(),
            DataType::Uuid => "UNIQUEIDENTIFIER".into(),
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            // BIT literals are 0/1, and unicode strings take the N prefix.
            Value::Bool(v) => if *v { "1" } else { "0" }.into(),
            Value::String(v) => format!("N'{}'", v.replace('\'', "''")),
            other => default_literal(other),
        }
    }

    fn auto_increment(&self) -> AutoIncrement {
        AutoIncrement::Keyword("IDENTITY(1,1)")
    }

    fn identifiers_equal(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn supports_include_columns(&self) -> bool {
        true
    }

    fn rename_style(&self) -> RenameStyle {
        RenameStyle::StoredProcedure
    }

    fn change_column_style(&self) -> ChangeColumnStyle {
        ChangeColumnStyle::AlterColumn
    }

    fn drop_index_style(&self) -> DropIndexStyle {
        DropIndexStyle::OnTable
    }

    fn drop_default_style(&self) -> DropDefaultStyle {
        DropDefaultStyle::NamedConstraint
    }

    fn identity_query(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("SELECT CAST(SCOPE_IDENTITY() AS BIGINT)".into())
    }

    fn database_exists_query(&self, name: &str) -> Result<SqlStatement> {
        Ok(SqlStatement::with_params(
            "SELECT 1 FROM sys.databases WHERE name = @P1",
            vec![Value::String(name.to_string())],
        ))
    }
}

fn default_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float32(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::Decimal(v) => v.clone(),
        Value::Bytes(v) => {
            let hex: String = v.iter().map(|b| format!("{:02x}", b)).collect();
            format!("0x{}", hex)
        }
        Value::Uuid(v) => format!("'{}'", v),
        Value::Date(v) => format!("'{}'", v),
        Value::Time(v) => format!("'{}'", v),
        Value::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        Value::DateTimeUtc(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        Value::Bool(_) | Value::String(_) => unreachable!("handled by the dialect"),
    }
}
