//! DML statement generation
//!
//! Parameterized INSERT/UPDATE/DELETE builders over named-value tuples.
//! Values never appear in the statement text; they are bound positionally
//! using the dialect's placeholder syntax. Identifiers go through the
//! dialect's escaping.

use crate::{Result, SqlDialect, SqlStatement, Value};

/// Stateless DML builder over a dialect's capabilities.
pub struct DmlGenerator<'a> {
    dialect: &'a dyn SqlDialect,
}

impl<'a> DmlGenerator<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self { dialect }
    }

    fn quote(&self, identifier: &str) -> String {
        self.dialect.escape_identifier(identifier)
    }

    /// INSERT of one row of named values.
    pub fn insert(&self, table: &str, values: &[(String, Value)]) -> SqlStatement {
        let columns: Vec<String> = values.iter().map(|(name, _)| self.quote(name)).collect();
        let placeholders: Vec<String> = (1..=values.len())
            .map(|i| self.dialect.placeholder(i))
            .collect();

        SqlStatement::with_params(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.quote(table),
                columns.join(", "),
                placeholders.join(", ")
            ),
            values.iter().map(|(_, value)| value.clone()).collect(),
        )
    }

    /// UPDATE of the named SET values on rows matching all WHERE values.
    /// An empty WHERE list updates every row.
    pub fn update(
        &self,
        table: &str,
        set: &[(String, Value)],
        filter: &[(String, Value)],
    ) -> SqlStatement {
        let mut params = Vec::with_capacity(set.len() + filter.len());
        let mut index = 0usize;

        let assignments: Vec<String> = set
            .iter()
            .map(|(name, value)| {
                index += 1;
                params.push(value.clone());
                format!("{} = {}", self.quote(name), self.dialect.placeholder(index))
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.quote(table),
            assignments.join(", ")
        );
        sql.push_str(&self.filter_clause(filter, &mut index, &mut params));

        SqlStatement::with_params(sql, params)
    }

    /// DELETE of rows matching all WHERE values. An empty WHERE list
    /// deletes every row.
    pub fn delete(&self, table: &str, filter: &[(String, Value)]) -> SqlStatement {
        let mut params = Vec::with_capacity(filter.len());
        let mut index = 0usize;

        let mut sql = format!("DELETE FROM {}", self.quote(table));
        sql.push_str(&self.filter_clause(filter, &mut index, &mut params));

        SqlStatement::with_params(sql, params)
    }

    /// Single-column UPDATE across all rows, used to backfill a value
    /// during a schema change.
    pub fn set_column_value(&self, table: &str, column: &str, value: Value) -> SqlStatement {
        SqlStatement::with_params(
            format!(
                "UPDATE {} SET {} = {}",
                self.quote(table),
                self.quote(column),
                self.dialect.placeholder(1)
            ),
            vec![value],
        )
    }

    /// Row count of a table — the minimal existing-rows read path.
    pub fn count(&self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", self.quote(table))
    }

    /// Identity value generated by the most recent insert on this
    /// connection.
    pub fn last_identity(&self, table: &str, column: &str) -> Result<String> {
        self.dialect.identity_query(table, column)
    }

    fn filter_clause(
        &self,
        filter: &[(String, Value)],
        index: &mut usize,
        params: &mut Vec<Value>,
    ) -> String {
        if filter.is_empty() {
            return String::new();
        }

        let predicates: Vec<String> = filter
            .iter()
            .map(|(name, value)| {
                // NULL never matches `= ?`; emit IS NULL without a parameter.
                if value.is_null() {
                    format!("{} IS NULL", self.quote(name))
                } else {
                    *index += 1;
                    params.push(value.clone());
                    format!("{} = {}", self.quote(name), self.dialect.placeholder(*index))
                }
            })
            .collect();

        format!(" WHERE {}", predicates.join(" AND "))
    }
}
