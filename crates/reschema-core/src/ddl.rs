//! DDL statement generation
//!
//! One builder per structural mutation. All identifiers pass through the
//! dialect's escaping; statement shapes follow the dialect's declared
//! capabilities. Drops never use `IF EXISTS` — removing an absent name is
//! a caller error and must surface as an engine failure.

use crate::{
    AutoIncrement, ChangeColumnStyle, ColumnDef, DropDefaultStyle, DropForeignKeyStyle,
    DropIndexStyle, DropPrimaryKeyStyle, ForeignKeyDef, RenameStyle, Result, SchemaError,
    SqlDialect, Value,
};

/// Stateless DDL builder over a dialect's capabilities.
pub struct DdlGenerator<'a> {
    dialect: &'a dyn SqlDialect,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self { dialect }
    }

    fn quote(&self, identifier: &str) -> String {
        self.dialect.escape_identifier(identifier)
    }

    fn quote_list(&self, identifiers: &[String]) -> String {
        identifiers
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_database(&self, name: &str) -> String {
        format!("CREATE DATABASE {}", self.quote(name))
    }

    pub fn drop_database(&self, name: &str) -> String {
        format!("DROP DATABASE {}", self.quote(name))
    }

    /// CREATE TABLE with column definitions, a primary key (inline for a
    /// single key column, table-level for a composite key) and named
    /// foreign key constraints.
    pub fn add_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        foreign_keys: &[ForeignKeyDef],
    ) -> Result<String> {
        let pk_columns: Vec<&ColumnDef> = columns.iter().filter(|c| c.primary_key).collect();
        let inline_pk = pk_columns.len() == 1;

        let mut ddl = format!("CREATE TABLE {} (", self.quote(table));

        let column_defs: Vec<String> = columns
            .iter()
            .map(|column| self.column_definition(column, inline_pk && column.primary_key))
            .collect::<Result<_>>()?;
        ddl.push_str(&column_defs.join(", "));

        if pk_columns.len() > 1 {
            let names: Vec<String> = pk_columns.iter().map(|c| c.name.clone()).collect();
            ddl.push_str(&format!(", PRIMARY KEY ({})", self.quote_list(&names)));
        }

        for foreign_key in foreign_keys {
            let name = foreign_key.name.as_deref().ok_or_else(|| {
                SchemaError::Validation("foreignKey: name must be resolved before generation".into())
            })?;
            ddl.push_str(", ");
            ddl.push_str(&self.foreign_key_constraint(name, foreign_key));
        }

        ddl.push(')');
        Ok(ddl)
    }

    pub fn remove_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote(table))
    }

    pub fn rename_table(&self, table: &str, new_table: &str) -> String {
        match self.dialect.rename_style() {
            RenameStyle::AlterRename => format!(
                "ALTER TABLE {} RENAME TO {}",
                self.quote(table),
                self.quote(new_table)
            ),
            RenameStyle::StoredProcedure => format!(
                "EXEC sp_rename '{}', '{}'",
                table.replace('\'', "''"),
                new_table.replace('\'', "''")
            ),
        }
    }

    /// ALTER TABLE … ADD for a single column. A declared default is
    /// rendered as a literal `DEFAULT` clause.
    pub fn add_column(&self, table: &str, column: &ColumnDef) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            self.quote(table),
            self.column_definition(column, false)?
        ))
    }

    /// Statement sequence adding a non-nullable column to a table with
    /// existing rows: the column arrives with a `DEFAULT` clause so
    /// existing rows receive the supplied value, then the implicit
    /// default is dropped again where the engine allows it.
    pub fn add_column_with_default(
        &self,
        table: &str,
        column: &ColumnDef,
        default: &Value,
    ) -> Result<Vec<String>> {
        let definition = self.column_definition(column, false)?;
        let mut statements = Vec::new();

        match self.dialect.drop_default_style() {
            DropDefaultStyle::AlterColumn => {
                statements.push(format!(
                    "ALTER TABLE {} ADD {} DEFAULT {}",
                    self.quote(table),
                    definition,
                    self.dialect.literal(default)
                ));
                statements.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                    self.quote(table),
                    self.quote(&column.name)
                ));
            }
            DropDefaultStyle::NamedConstraint => {
                let constraint = format!("DF_{}_{}", table, column.name);
                statements.push(format!(
                    "ALTER TABLE {} ADD {} CONSTRAINT {} DEFAULT {}",
                    self.quote(table),
                    definition,
                    self.quote(&constraint),
                    self.dialect.literal(default)
                ));
                statements.push(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.quote(table),
                    self.quote(&constraint)
                ));
            }
            DropDefaultStyle::Retain => {
                statements.push(format!(
                    "ALTER TABLE {} ADD {} DEFAULT {}",
                    self.quote(table),
                    definition,
                    self.dialect.literal(default)
                ));
            }
        }

        Ok(statements)
    }

    /// Statement sequence altering an existing column's type and
    /// nullability.
    pub fn change_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>> {
        let table_sql = self.quote(table);
        let column_sql = self.quote(&column.name);
        let type_sql = self.dialect.sql_type(&column.data_type);

        match self.dialect.change_column_style() {
            ChangeColumnStyle::AlterColumn => Ok(vec![format!(
                "ALTER TABLE {} ALTER COLUMN {} {}{}",
                table_sql,
                column_sql,
                type_sql,
                if column.nullable { " NULL" } else { " NOT NULL" }
            )]),
            ChangeColumnStyle::ModifyColumn => Ok(vec![format!(
                "ALTER TABLE {} MODIFY COLUMN {} {}{}",
                table_sql,
                column_sql,
                type_sql,
                if column.nullable { "" } else { " NOT NULL" }
            )]),
            ChangeColumnStyle::TypeAndNullability => Ok(vec![
                format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                    table_sql, column_sql, type_sql
                ),
                format!(
                    "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL",
                    table_sql,
                    column_sql,
                    if column.nullable { "DROP" } else { "SET" }
                ),
            ]),
            ChangeColumnStyle::Unsupported => Err(SchemaError::NotSupported(format!(
                "{} cannot alter column \"{}\" in place",
                self.dialect.name(),
                column.name
            ))),
        }
    }

    pub fn remove_column(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table),
            self.quote(column)
        )
    }

    pub fn rename_column(&self, table: &str, column: &str, new_column: &str) -> String {
        match self.dialect.rename_style() {
            RenameStyle::AlterRename => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                self.quote(table),
                self.quote(column),
                self.quote(new_column)
            ),
            RenameStyle::StoredProcedure => format!(
                "EXEC sp_rename '{}.{}', '{}', 'COLUMN'",
                table.replace('\'', "''"),
                column.replace('\'', "''"),
                new_column.replace('\'', "''")
            ),
        }
    }

    pub fn add_primary_key(
        &self,
        table: &str,
        columns: &[String],
        name: &str,
    ) -> Result<String> {
        if !self.dialect.supports_primary_key_alter() {
            return Err(SchemaError::NotSupported(format!(
                "{} cannot add a primary key to an existing table",
                self.dialect.name()
            )));
        }
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.quote(table),
            self.quote(name),
            self.quote_list(columns)
        ))
    }

    pub fn remove_primary_key(&self, table: &str, name: &str) -> Result<String> {
        match self.dialect.drop_primary_key_style() {
            DropPrimaryKeyStyle::DropConstraint => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote(table),
                self.quote(name)
            )),
            DropPrimaryKeyStyle::DropPrimaryKey => {
                Ok(format!("ALTER TABLE {} DROP PRIMARY KEY", self.quote(table)))
            }
            DropPrimaryKeyStyle::Unsupported => Err(SchemaError::NotSupported(format!(
                "{} cannot remove the primary key of an existing table",
                self.dialect.name()
            ))),
        }
    }

    pub fn add_foreign_key(&self, table: &str, foreign_key: &ForeignKeyDef, name: &str) -> Result<String> {
        if !self.dialect.supports_foreign_key_alter() {
            return Err(SchemaError::NotSupported(format!(
                "{} supports foreign keys only at table creation",
                self.dialect.name()
            )));
        }
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            self.quote(table),
            self.foreign_key_constraint(name, foreign_key)
        ))
    }

    pub fn remove_foreign_key(&self, table: &str, name: &str) -> Result<String> {
        match self.dialect.drop_foreign_key_style() {
            DropForeignKeyStyle::DropConstraint => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote(table),
                self.quote(name)
            )),
            DropForeignKeyStyle::DropForeignKey => Ok(format!(
                "ALTER TABLE {} DROP FOREIGN KEY {}",
                self.quote(table),
                self.quote(name)
            )),
            DropForeignKeyStyle::Unsupported => Err(SchemaError::NotSupported(format!(
                "{} supports foreign keys only at table creation",
                self.dialect.name()
            ))),
        }
    }

    pub fn add_index(
        &self,
        table: &str,
        columns: &[String],
        unique: bool,
        name: &str,
        include_columns: &[String],
    ) -> Result<String> {
        if !include_columns.is_empty() && !self.dialect.supports_include_columns() {
            return Err(SchemaError::NotSupported(format!(
                "{} does not support INCLUDE columns on indexes",
                self.dialect.name()
            )));
        }

        let mut ddl = format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote(name),
            self.quote(table),
            self.quote_list(columns)
        );
        if !include_columns.is_empty() {
            ddl.push_str(&format!(" INCLUDE ({})", self.quote_list(include_columns)));
        }
        Ok(ddl)
    }

    pub fn remove_index(&self, table: &str, name: &str) -> String {
        match self.dialect.drop_index_style() {
            DropIndexStyle::Plain => format!("DROP INDEX {}", self.quote(name)),
            DropIndexStyle::OnTable => format!(
                "DROP INDEX {} ON {}",
                self.quote(name),
                self.quote(table)
            ),
        }
    }

    /// Column definition fragment shared by CREATE TABLE and ADD column.
    fn column_definition(&self, column: &ColumnDef, inline_primary_key: bool) -> Result<String> {
        let type_sql = if column.auto_increment {
            match self.dialect.auto_increment() {
                AutoIncrement::Keyword(_) => self.dialect.sql_type(&column.data_type),
                AutoIncrement::TypeSubstitution => {
                    self.dialect.auto_increment_type(&column.data_type)
                }
            }
        } else {
            self.dialect.sql_type(&column.data_type)
        };

        let mut definition = format!("{} {}", self.quote(&column.name), type_sql);

        if !column.nullable && !inline_primary_key {
            definition.push_str(" NOT NULL");
        }

        if inline_primary_key {
            definition.push_str(" PRIMARY KEY");
        }

        if column.auto_increment {
            if let AutoIncrement::Keyword(keyword) = self.dialect.auto_increment() {
                definition.push(' ');
                definition.push_str(keyword);
            }
        }

        if let Some(default) = &column.default {
            definition.push_str(&format!(" DEFAULT {}", self.dialect.literal(default)));
        }

        Ok(definition)
    }

    fn foreign_key_constraint(&self, name: &str, foreign_key: &ForeignKeyDef) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote(name),
            self.quote_list(&foreign_key.columns),
            self.quote(&foreign_key.referenced_table),
            self.quote_list(&foreign_key.referenced_columns)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    struct TestDialect;

    impl SqlDialect for TestDialect {
        fn name(&self) -> &'static str {
            "test"
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

        fn identity_query(&self, _table: &str, _column: &str) -> crate::Result<String> {
            Err(SchemaError::NotSupported("identity retrieval".into()))
        }
    }

    fn generator() -> DdlGenerator<'static> {
        static DIALECT: TestDialect = TestDialect;
        DdlGenerator::new(&DIALECT)
    }

    #[test]
    fn composite_primary_key_becomes_table_level_clause() {
        let sql = generator()
            .add_table(
                "pair",
                &[
                    ColumnDef::new("a", DataType::Integer).primary_key(),
                    ColumnDef::new("b", DataType::Integer).primary_key(),
                ],
                &[],
            )
            .expect("should generate DDL");

        assert_eq!(
            sql,
            "CREATE TABLE \"pair\" (\"a\" INT NOT NULL, \"b\" INT NOT NULL, PRIMARY KEY (\"a\", \"b\"))"
        );
    }

    #[test]
    fn declared_default_is_rendered_as_literal() {
        let sql = generator()
            .add_column(
                "users",
                &ColumnDef::new("state", DataType::VarChar(10))
                    .default_value(Value::String("new".into())),
            )
            .expect("should generate DDL");

        assert_eq!(
            sql,
            "ALTER TABLE \"users\" ADD \"state\" VARCHAR(10) NOT NULL DEFAULT 'new'"
        );
    }

    #[test]
    fn unresolved_foreign_key_name_is_rejected() {
        let fk = ForeignKeyDef::new(["user_id"], "users", ["id"]);
        let err = generator()
            .add_table(
                "posts",
                &[ColumnDef::new("id", DataType::Integer)],
                &[fk],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::Validation(_)));
    }

    #[test]
    fn drops_never_use_if_exists() {
        assert_eq!(generator().remove_table("users"), "DROP TABLE \"users\"");
        assert_eq!(
            generator().remove_column("users", "name"),
            "ALTER TABLE \"users\" DROP COLUMN \"name\""
        );
        assert_eq!(
            generator().remove_index("users", "IX_users_name"),
            "DROP INDEX \"IX_users_name\""
        );
    }

    #[test]
    fn rename_statements() {
        assert_eq!(
            generator().rename_table("users", "accounts"),
            "ALTER TABLE \"users\" RENAME TO \"accounts\""
        );
        assert_eq!(
            generator().rename_column("users", "name", "full_name"),
            "ALTER TABLE \"users\" RENAME COLUMN \"name\" TO \"full_name\""
        );
    }
}
