//! Error taxonomy for the form engine

use thiserror::Error;

use crate::state::FieldType;

/// Message shown to the user when a submission cannot be completed
pub const SUBMISSION_ERROR_MESSAGE: &str =
    "An error occurred while submitting the form. Please try again.";

/// Message shown when a submit is rejected by validation
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Errors raised by the parser, the form state and the submission flow.
///
/// None of these are fatal to a built form: parse errors skip a single tag,
/// validation and submission errors leave the form open for another try.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopupError {
    #[error("malformed component at byte {offset}: {message}")]
    ParseRecoverable { offset: usize, message: String },

    #[error("Unsupported component type: {0}")]
    UnsupportedComponentType(String),

    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' has no option '{value}'")]
    UnknownOption { field: String, value: String },

    #[error("field '{id}' of type {field_type} cannot hold a {value_kind} value")]
    ValueTypeMismatch {
        id: String,
        field_type: FieldType,
        value_kind: &'static str,
    },

    #[error("validation failed, first invalid field: {first_invalid}")]
    ValidationFailure { first_invalid: String },

    #[error("submission failed: {0}")]
    SubmissionFailure(String),
}

impl PopupError {
    /// Whether the scanner may skip the offending tag and keep going
    pub fn is_recoverable_parse_error(&self) -> bool {
        matches!(
            self,
            PopupError::ParseRecoverable { .. } | PopupError::UnsupportedComponentType(_)
        )
    }

    /// Text suitable for showing to the person filling the form
    pub fn user_message(&self) -> String {
        match self {
            PopupError::SubmissionFailure(_) => SUBMISSION_ERROR_MESSAGE.to_string(),
            PopupError::ValidationFailure { .. } => REQUIRED_FIELDS_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PopupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let err = PopupError::UnsupportedComponentType("slider".to_string());
        assert_eq!(err.to_string(), "Unsupported component type: slider");
        assert!(err.is_recoverable_parse_error());
    }

    #[test]
    fn test_submission_failure_user_message_hides_cause() {
        let err = PopupError::SubmissionFailure("connection reset".to_string());
        assert_eq!(err.user_message(), SUBMISSION_ERROR_MESSAGE);
        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_recoverable_parse_error());
    }

    #[test]
    fn test_validation_failure_user_message() {
        let err = PopupError::ValidationFailure {
            first_invalid: "name".to_string(),
        };
        assert_eq!(err.user_message(), REQUIRED_FIELDS_MESSAGE);
        assert_eq!(
            err.to_string(),
            "validation failed, first invalid field: name"
        );
    }

    #[test]
    fn test_type_mismatch_names_field_type() {
        let err = PopupError::ValueTypeMismatch {
            id: "tags".to_string(),
            field_type: FieldType::Checkbox,
            value_kind: "text",
        };
        assert_eq!(
            err.to_string(),
            "field 'tags' of type checkbox cannot hold a text value"
        );
    }
}
