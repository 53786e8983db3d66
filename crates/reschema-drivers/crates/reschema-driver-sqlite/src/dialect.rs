//! SQLite SQL dialect

use reschema_core::{
    AutoIncrement, ChangeColumnStyle, DataType, DropDefaultStyle, DropForeignKeyStyle,
    DropPrimaryKeyStyle, Result, SqlDialect,
};

/// SQLite dialect. ALTER TABLE covers column add/drop/rename only:
/// primary keys, foreign keys and column redefinitions exist from table
/// creation time and cannot be mutated in place.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn max_identifier_length(&self) -> usize {
        // The engine imposes no documented limit; bound generated names anyway.
        2048
    }

    fn sql_type(&self, data_type: &DataType) -> String {
        match data_type {
            // AUTOINCREMENT requires the exact INTEGER type name.
            DataType::Integer => "INTEGER".into(),
            DataType::BigInt => "INTEGER".into(),
            other => default_sql_type(self, other),
        }
    }

    fn auto_increment(&self) -> AutoIncrement {
        AutoIncrement::Keyword("AUTOINCREMENT")
    }

    fn insert_null_for_auto_increment_primary_key(&self) -> bool {
        true
    }

    fn identifiers_equal(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn supports_primary_key_alter(&self) -> bool {
        false
    }

    fn supports_foreign_key_alter(&self) -> bool {
        false
    }

    fn change_column_style(&self) -> ChangeColumnStyle {
        ChangeColumnStyle::Unsupported
    }

    fn drop_primary_key_style(&self) -> DropPrimaryKeyStyle {
        DropPrimaryKeyStyle::Unsupported
    }

    fn drop_foreign_key_style(&self) -> DropForeignKeyStyle {
        DropForeignKeyStyle::Unsupported
    }

    fn drop_default_style(&self) -> DropDefaultStyle {
        DropDefaultStyle::Retain
    }

    fn identity_query(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("SELECT last_insert_rowid()".into())
    }
}

/// The trait's default mapping, reachable despite the override above.
fn default_sql_type(dialect: &dyn SqlDialect, data_type: &DataType) -> String {
    match data_type {
        DataType::Boolean => "BOOLEAN".into(),
        DataType::SmallInt => "SMALLINT".into(),
        DataType::Real => "REAL".into(),
        DataType::Double => "DOUBLE PRECISION".into(),
        DataType::Decimal(precision, scale) => format!("DECIMAL({}, {})", precision, scale),
        DataType::Char(len) => format!("CHAR({})", len),
        DataType::VarChar(len) => format!("VARCHAR({})", len),
        DataType::NVarChar(len) => format!("{}({})", dialect.unicode_text_type(), len),
        DataType::Text => "TEXT".into(),
        DataType::Blob => "BLOB".into(),
        DataType::Date => "DATE".into(),
        DataType::Time => "TIME".into(),
        DataType::DateTime => dialect.datetime_type().into(),
        DataType::Uuid => "CHAR(36)".into(),
        DataType::Integer | DataType::BigInt => "INTEGER".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reschema_core::{ColumnDef, DdlGenerator, ForeignKeyDef};

    fn generator() -> DdlGenerator<'static> {
        static DIALECT: SqliteDialect = SqliteDialect;
        DdlGenerator::new(&DIALECT)
    }

    #[test]
    fn create_table_with_auto_increment_primary_key() {
        let ddl = generator()
            .add_table(
                "users",
                &[
                    ColumnDef::new("id", DataType::Integer)
                        .primary_key()
                        .auto_increment(),
                    ColumnDef::new("name", DataType::Text),
                ],
                &[],
            )
            .expect("should generate DDL");

        assert_eq!(
            ddl,
            "CREATE TABLE \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT NOT NULL)"
        );
    }

    #[test]
    fn create_table_with_foreign_key() {
        let fk = ForeignKeyDef::new(["user_id"], "users", ["id"]).named("FK_posts_user_id");
        let ddl = generator()
            .add_table(
                "posts",
                &[
                    ColumnDef::new("id", DataType::Integer).primary_key(),
                    ColumnDef::new("user_id", DataType::Integer),
                ],
                &[fk],
            )
            .expect("should generate DDL");

        assert!(ddl.contains(
            "CONSTRAINT \"FK_posts_user_id\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\")"
        ));
    }

    #[test]
    fn primary_key_alter_is_not_supported() {
        let err = generator()
            .add_primary_key("users", &["id".to_string()], "PK_users")
            .unwrap_err();
        assert!(err.to_string().contains("sqlite"));

        assert!(generator().remove_primary_key("users", "PK_users").is_err());
    }

    #[test]
    fn foreign_key_alter_is_not_supported() {
        let fk = ForeignKeyDef::new(["user_id"], "users", ["id"]);
        assert!(generator().add_foreign_key("posts", &fk, "FK_x").is_err());
        assert!(generator().remove_foreign_key("posts", "FK_x").is_err());
    }

    #[test]
    fn change_column_is_not_supported() {
        let def = ColumnDef::new("name", DataType::Text).nullable();
        assert!(generator().change_column("users", &def).is_err());
    }

    #[test]
    fn add_index_statements() {
        let ddl = generator()
            .add_index(
                "users",
                &["email".to_string()],
                true,
                "UX_users_email",
                &[],
            )
            .expect("should generate DDL");
        assert_eq!(
            ddl,
            "CREATE UNIQUE INDEX \"UX_users_email\" ON \"users\" (\"email\")"
        );

        assert_eq!(
            generator().remove_index("users", "UX_users_email"),
            "DROP INDEX \"UX_users_email\""
        );
    }

    #[test]
    fn include_columns_are_rejected() {
        let err = generator()
            .add_index(
                "users",
                &["email".to_string()],
                false,
                "IX_users_email",
                &["name".to_string()],
            )
            .unwrap_err();
        assert!(err.to_string().contains("INCLUDE"));
    }

    #[test]
    fn add_column_with_default_keeps_default() {
        let statements = generator()
            .add_column_with_default(
                "users",
                &ColumnDef::new("age", DataType::Integer),
                &reschema_core::Value::Int32(0),
            )
            .expect("should generate DDL");

        // SQLite cannot drop the default afterwards; one statement only.
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            "ALTER TABLE \"users\" ADD \"age\" INTEGER NOT NULL DEFAULT 0"
        );
    }
}
