//! Validation error types

use std::fmt;

/// Validation error for labels and activity text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty (or only whitespace) when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "activity detail",
            max: 2000,
        };
        assert_eq!(
            err.to_string(),
            "activity detail exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ValidationError::Empty { field: "member label" }.to_string(),
            "member label cannot be empty"
        );
    }
}
