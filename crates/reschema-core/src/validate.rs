//! Argument validation
//!
//! All validation happens before any statement is built; failures carry
//! the argument name and the violated constraint.

use crate::{Result, SchemaError};

/// The argument must be a non-empty string.
pub fn not_empty(value: &str, argument: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SchemaError::Validation(format!(
            "{}: value cannot be empty",
            argument
        )));
    }
    Ok(())
}

/// The argument must not exceed the engine's identifier length limit.
pub fn max_length(value: &str, argument: &str, limit: usize) -> Result<()> {
    let length = value.chars().count();
    if length > limit {
        return Err(SchemaError::Validation(format!(
            "{}: identifier \"{}\" is {} characters, engine limit is {}",
            argument, value, length, limit
        )));
    }
    Ok(())
}

/// Combined identifier check: non-empty and within the length limit.
pub fn identifier(value: &str, argument: &str, limit: usize) -> Result<()> {
    not_empty(value, argument)?;
    max_length(value, argument, limit)
}

/// The argument must contain at least one element.
pub fn non_empty_slice<T>(values: &[T], argument: &str) -> Result<()> {
    if values.is_empty() {
        return Err(SchemaError::Validation(format!(
            "{}: at least one element is required",
            argument
        )));
    }
    Ok(())
}

/// Every element must be a valid identifier.
pub fn identifiers(values: &[String], argument: &str, limit: usize) -> Result<()> {
    non_empty_slice(values, argument)?;
    for value in values {
        identifier(value, argument, limit)?;
    }
    Ok(())
}

/// Two positionally-corresponding lists must have the same length.
pub fn same_length<T, U>(a: &[T], b: &[U], argument_a: &str, argument_b: &str) -> Result<()> {
    if a.len() != b.len() {
        return Err(SchemaError::Validation(format!(
            "{} has {} elements but {} has {}; the lists correspond positionally",
            argument_a,
            a.len(),
            argument_b,
            b.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_identifier() {
        let err = identifier("", "tableName", 64).unwrap_err();
        assert!(err.to_string().contains("tableName"));
    }

    #[test]
    fn rejects_over_long_identifier() {
        let name = "x".repeat(65);
        let err = identifier(&name, "indexName", 64).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("indexName"));
        assert!(message.contains("64"));
    }

    #[test]
    fn accepts_identifier_at_limit() {
        let name = "x".repeat(64);
        assert!(identifier(&name, "indexName", 64).is_ok());
    }

    #[test]
    fn rejects_mismatched_column_lists() {
        let local = vec!["a".to_string(), "b".to_string()];
        let referenced = vec!["c".to_string()];
        assert!(same_length(&local, &referenced, "columns", "referencedColumns").is_err());
    }
}
