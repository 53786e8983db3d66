//! Naming conventions for generated constraint and index identifiers

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Derives default names for indexes, foreign keys and primary keys when
/// the caller does not supply one.
///
/// Implementations must be deterministic (identical inputs always produce
/// the identical name), must never exceed the identifier-length limit
/// they were configured with, and must produce different names for a
/// unique and a non-unique index over the same columns.
pub trait NamingConvention: Send + Sync {
    fn index_name(&self, table: &str, columns: &[String], unique: bool) -> String;

    fn foreign_key_name(&self, table: &str, columns: &[String]) -> String;

    fn primary_key_name(&self, table: &str) -> String;
}

/// Default convention: `IX_`/`UX_`/`FK_`/`PK_` prefix, table and column
/// names joined with underscores. Names exceeding the identifier limit
/// are truncated and suffixed with a stable hash of the full name so the
/// result stays deterministic and collision-resistant.
#[derive(Debug, Clone)]
pub struct DefaultNamingConvention {
    max_identifier_length: usize,
}

impl DefaultNamingConvention {
    pub fn new(max_identifier_length: usize) -> Self {
        Self {
            max_identifier_length,
        }
    }

    fn compose(&self, prefix: &str, table: &str, columns: &[String]) -> String {
        let mut name = format!("{}_{}", prefix, table);
        for column in columns {
            name.push('_');
            name.push_str(column);
        }
        self.fit(name)
    }

    /// Truncate an over-long name, replacing the tail with an 8-hex-digit
    /// hash of the full name.
    fn fit(&self, name: String) -> String {
        if name.chars().count() <= self.max_identifier_length {
            return name;
        }

        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        let suffix = format!("_{:08x}", hasher.finish() as u32);

        let keep = self.max_identifier_length.saturating_sub(suffix.len());
        let truncated: String = name.chars().take(keep).collect();
        format!("{}{}", truncated, suffix)
    }
}

impl NamingConvention for DefaultNamingConvention {
    fn index_name(&self, table: &str, columns: &[String], unique: bool) -> String {
        self.compose(if unique { "UX" } else { "IX" }, table, columns)
    }

    fn foreign_key_name(&self, table: &str, columns: &[String]) -> String {
        self.compose("FK", table, columns)
    }

    fn primary_key_name(&self, table: &str) -> String {
        self.compose("PK", table, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn derives_prefixed_names() {
        let convention = DefaultNamingConvention::new(128);
        assert_eq!(
            convention.index_name("Order", &columns(&["OrderId"]), false),
            "IX_Order_OrderId"
        );
        assert_eq!(
            convention.index_name("Order", &columns(&["OrderId"]), true),
            "UX_Order_OrderId"
        );
        assert_eq!(
            convention.foreign_key_name("Order", &columns(&["CustomerId"])),
            "FK_Order_CustomerId"
        );
        assert_eq!(convention.primary_key_name("Order"), "PK_Order");
    }

    #[test]
    fn unique_and_non_unique_names_differ() {
        let convention = DefaultNamingConvention::new(128);
        let cols = columns(&["A", "B"]);
        assert_ne!(
            convention.index_name("T", &cols, true),
            convention.index_name("T", &cols, false)
        );
    }

    #[test]
    fn names_are_deterministic() {
        let convention = DefaultNamingConvention::new(64);
        let cols = columns(&["SomeColumn", "OtherColumn"]);
        assert_eq!(
            convention.index_name("SomeTable", &cols, false),
            convention.index_name("SomeTable", &cols, false)
        );
    }

    #[test]
    fn long_names_are_truncated_within_limit() {
        let convention = DefaultNamingConvention::new(30);
        let cols = columns(&["AVeryLongColumnName", "AnotherVeryLongColumnName"]);
        let name = convention.index_name("ATableWithALongName", &cols, false);

        assert!(name.chars().count() <= 30, "name too long: {}", name);
        // Stable across calls
        assert_eq!(name, convention.index_name("ATableWithALongName", &cols, false));
        // Still discriminates unique from non-unique
        assert_ne!(name, convention.index_name("ATableWithALongName", &cols, true));
    }

    #[test]
    fn truncated_names_differ_for_different_inputs() {
        let convention = DefaultNamingConvention::new(24);
        let a = convention.index_name("Table", &columns(&["ColumnNameNumberOne"]), false);
        let b = convention.index_name("Table", &columns(&["ColumnNameNumberTwo"]), false);
        assert_ne!(a, b);
    }
}
