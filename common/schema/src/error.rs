use std::fmt;

use thiserror::Error;

/// Why a single field failed its rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("is required")]
    Missing,
    #[error("must be {expected}, got {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("must be an integer")]
    NotInteger,
    #[error("must be greater than or equal to {min}")]
    BelowMinimum { min: f64 },
    #[error("must be less than or equal to {max}")]
    AboveMaximum { max: f64 },
    #[error("length must be at least {min} characters")]
    TooShort { min: usize },
    #[error("length must be at most {max} characters")]
    TooLong { max: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {}", self.field, self.violation)
    }
}

/// Every violation found in one event, in schema declaration order.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Returns `None` when `violations` is empty so an error never carries
    /// an empty list.
    pub fn from_violations(violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|item| item.field.as_str())
    }

    pub fn violation_for(&self, field: &str) -> Option<&Violation> {
        self.violations
            .iter()
            .find(|item| item.field == field)
            .map(|item| &item.violation)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_violation_list_is_not_an_error() {
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn message_lists_every_field() {
        let err = ValidationError::from_violations(vec![
            FieldViolation {
                field: "name".into(),
                violation: Violation::WrongType {
                    expected: "a string",
                    found: "a number",
                },
            },
            FieldViolation {
                field: "age".into(),
                violation: Violation::AboveMaximum { max: 120.0 },
            },
        ])
        .expect("error");

        assert_eq!(
            err.to_string(),
            "validation failed: 'name' must be a string, got a number; \
             'age' must be less than or equal to 120"
        );
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["name", "age"]);
    }
}
