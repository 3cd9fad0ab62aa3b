//! Per-field validation gated by visibility and requiredness

use super::evaluator::{is_required, is_visible};
use super::field::{Field, FieldType};
use super::responses::{FieldValue, ResponseStore};

/// Outcome of validating every visible field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// `(field id, has error)` for each visible field, in document order
    pub errors: Vec<(String, bool)>,
    /// First failing field in document order, for focus and scrolling
    pub first_invalid: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.first_invalid.is_none()
    }

    pub fn has_error(&self, id: &str) -> bool {
        self.errors
            .iter()
            .any(|(field_id, has_error)| field_id == id && *has_error)
    }

    pub fn invalid_ids(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(|(_, has_error)| *has_error)
            .map(|(id, _)| id.as_str())
    }
}

/// Check one field's value given its effective requiredness
pub fn validate_field(field: &Field, value: Option<&FieldValue>, required: bool) -> bool {
    if !required {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    match field.field_type {
        FieldType::Checkbox => !value.as_selection().is_empty(),
        FieldType::RadioButton | FieldType::Dropdown | FieldType::TextField | FieldType::TextArea => {
            value.has_content()
        }
    }
}

/// Validate every visible field. Hidden fields are skipped entirely.
pub fn validate<'a>(fields: impl IntoIterator<Item = &'a Field>, store: &ResponseStore) -> ValidationReport {
    let mut report = ValidationReport::default();
    for field in fields {
        if !is_visible(field, store) {
            continue;
        }
        let required = is_required(field, store);
        let valid = validate_field(field, store.get(field.id()), required);
        if !valid && report.first_invalid.is_none() {
            report.first_invalid = Some(field.id().to_string());
        }
        report.errors.push((field.id().to_string(), !valid));
    }
    report
}
