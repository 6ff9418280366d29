use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),
    #[error("Not authorized")]
    Forbidden,
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Field-keyed list of human-readable violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when no violation was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, DomainError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(DomainError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_yield_value() {
        let result = ValidationErrors::new().into_result(7);
        assert!(matches!(result, Ok(7)));
    }

    #[test]
    fn recorded_errors_yield_invalid() {
        let result = ValidationErrors::single("value", "can't be blank").into_result(());
        match result {
            Err(DomainError::Invalid(errors)) => {
                assert_eq!(errors.get("value"), Some(&["can't be blank".to_string()][..]));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn display_joins_field_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("value", "is not a number");
        errors.add("product_id", "can't be blank");
        assert_eq!(errors.to_string(), "product_id can't be blank; value is not a number");
    }

    #[test]
    fn serializes_as_field_map() {
        let errors = ValidationErrors::single("value", "must be an integer");
        let json = serde_json::to_value(&errors).expect("serializable");
        assert_eq!(json, serde_json::json!({ "value": ["must be an integer"] }));
    }
}
