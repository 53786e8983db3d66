//! MySQL SQL dialect

use reschema_core::{
    AutoIncrement, ChangeColumnStyle, DataType, DropForeignKeyStyle, DropIndexStyle,
    DropPrimaryKeyStyle, Result, SqlDialect, SqlStatement, Value,
};

/// MySQL/MariaDB dialect: backtick quoting, 64-character identifiers,
/// `AUTO_INCREMENT`, and MySQL's own DROP statement shapes.
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn max_identifier_length(&self) -> usize {
        64
    }

    fn sql_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Double => "DOUBLE".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Integer => "INT".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Real => "FLOAT".into(),
            DataType::Decimal(precision, scale) => format!("DECIMAL({}, {})", precision, scale),
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

    fn auto_increment(&self) -> AutoIncrement {
        AutoIncrement::Keyword("AUTO_INCREMENT")
    }

    fn identifiers_equal(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn change_column_style(&self) -> ChangeColumnStyle {
        ChangeColumnStyle::ModifyColumn
    }

    fn drop_primary_key_style(&self) -> DropPrimaryKeyStyle {
        DropPrimaryKeyStyle::DropPrimaryKey
    }

    fn drop_foreign_key_style(&self) -> DropForeignKeyStyle {
        DropForeignKeyStyle::DropForeignKey
    }

    fn drop_index_style(&self) -> DropIndexStyle {
        DropIndexStyle::OnTable
    }

    fn identity_query(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("SELECT LAST_INSERT_ID()".into())
    }

    fn database_exists_query(&self, name: &str) -> Result<SqlStatement> {
        Ok(SqlStatement::with_params(
            "SELECT SCHEMA_NAME FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?",
            vec![Value::String(name.to_string())],
        ))
    }
}
