//! Form state: one live form instance
//!
//! Owns the parsed content, the response store, the latest evaluation and the
//! error flags. Every mutation goes through here and is reported to
//! subscribers as a [`StateChange`].

use super::evaluator::{evaluate, Evaluation};
use super::field::{Field, FieldType};
use super::responses::{FieldValue, ResponseStore};
use super::submission::SubmissionPhase;
use super::validator::{validate, ValidationReport};
use crate::config::PopupConfig;
use crate::error::{PopupError, Result};
use crate::parser::{parse_document, ContentElement, ParsedContent};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// What a single mutation affected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateChange {
    /// Field whose value was set, if any
    pub field: Option<String>,
    pub visibility: Vec<String>,
    pub required: Vec<String>,
    pub errors: Vec<String>,
    /// New submission phase, if it moved
    pub phase: Option<SubmissionPhase>,
}

impl StateChange {
    pub fn is_empty(&self) -> bool {
        self.field.is_none()
            && self.visibility.is_empty()
            && self.required.is_empty()
            && self.errors.is_empty()
            && self.phase.is_none()
    }

    /// Every field id touched by this change, without duplicates
    pub fn affected_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.field
            .iter()
            .chain(&self.visibility)
            .chain(&self.required)
            .chain(&self.errors)
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Handle returned by [`FormState::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&StateChange) + Send>;

/// A parsed form and everything the user has entered so far
pub struct FormState {
    pub(super) form_id: String,
    title: String,
    is_blocking: bool,
    content: ParsedContent,
    pub(super) responses: ResponseStore,
    evaluation: Evaluation,
    errors: HashMap<String, bool>,
    first_invalid: Option<String>,
    pub(super) phase: SubmissionPhase,
    pub(super) submission_error: Option<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("form_id", &self.form_id)
            .field("title", &self.title)
            .field("is_blocking", &self.is_blocking)
            .field("fields", &self.content.field_count())
            .field("phase", &self.phase)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl FormState {
    /// Build a form from already parsed content.
    ///
    /// Fails when two fields share an id, so that one can never silently
    /// overwrite the other's answer.
    pub fn new(
        form_id: impl Into<String>,
        title: impl Into<String>,
        is_blocking: bool,
        content: ParsedContent,
    ) -> Result<Self> {
        let mut ids = HashSet::new();
        for field in content.fields() {
            if !ids.insert(field.id()) {
                return Err(PopupError::DuplicateFieldId(field.id().to_string()));
            }
        }
        for field in content.fields() {
            if let Some(logic) = &field.conditional_logic {
                if !ids.contains(logic.depends_on.as_str()) {
                    tracing::warn!(
                        "field '{}' depends on unknown field '{}'",
                        field.id(),
                        logic.depends_on
                    );
                }
            }
        }

        let responses = ResponseStore::seeded(content.fields());
        let evaluation = evaluate(content.fields(), &responses);
        let errors = content.fields().map(|f| (f.id().to_string(), false)).collect();

        Ok(Self {
            form_id: form_id.into(),
            title: title.into(),
            is_blocking,
            content,
            responses,
            evaluation,
            errors,
            first_invalid: None,
            phase: SubmissionPhase::Idle,
            submission_error: None,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Parse the config's markdown and build the form
    pub fn from_config(config: &PopupConfig) -> Result<Self> {
        let content = parse_document(&config.markdown_content);
        Self::new(&config.id, &config.title, config.is_blocking, content)
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_blocking(&self) -> bool {
        self.is_blocking
    }

    pub fn content_flow(&self) -> &[ContentElement] {
        &self.content.content_flow
    }

    pub fn diagnostics(&self) -> &[PopupError] {
        &self.content.diagnostics
    }

    /// Fields in document order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.content.fields()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.content.field(id)
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.responses.get(id)
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.evaluation.is_visible(id)
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.evaluation.is_required(id)
    }

    /// Visible fields in document order
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|f| self.evaluation.is_visible(f.id()))
    }

    pub fn has_error(&self, id: &str) -> bool {
        self.errors.get(id).copied().unwrap_or(false)
    }

    pub fn has_validation_errors(&self) -> bool {
        self.errors.values().any(|e| *e)
    }

    pub fn first_invalid(&self) -> Option<&str> {
        self.first_invalid.as_deref()
    }

    /// Register a listener for state changes
    pub fn subscribe(&mut self, listener: impl FnMut(&StateChange) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(super) fn notify(&mut self, change: &StateChange) {
        if change.is_empty() {
            return;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }

    /// The single entry point for changing a field's value.
    ///
    /// Clears the field's error flag and the first-invalid pointer, then
    /// re-evaluates every field. Fields hidden by the change lose their
    /// error flag too.
    pub fn set_field_value(&mut self, id: &str, value: FieldValue) -> Result<StateChange> {
        let field_type = self
            .field(id)
            .map(|f| f.field_type)
            .ok_or_else(|| PopupError::UnknownField(id.to_string()))?;
        if !value.fits(field_type) {
            return Err(PopupError::ValueTypeMismatch {
                id: id.to_string(),
                field_type,
                value_kind: value.kind(),
            });
        }

        self.responses.replace(id, value);
        let mut change = StateChange {
            field: Some(id.to_string()),
            ..StateChange::default()
        };
        if self.errors.insert(id.to_string(), false) == Some(true) {
            change.errors.push(id.to_string());
        }
        self.first_invalid = None;

        let evaluation = evaluate(self.content.fields(), &self.responses);
        change.visibility = self.evaluation.visibility_changes(&evaluation);
        change.required = self.evaluation.required_changes(&evaluation);
        self.evaluation = evaluation;

        // A hidden field never carries an error flag
        let evaluation = &self.evaluation;
        for hidden in change.visibility.iter().filter(|v| !evaluation.is_visible(v.as_str())) {
            if self.errors.insert(hidden.clone(), false) == Some(true)
                && !change.errors.contains(hidden)
            {
                change.errors.push(hidden.clone());
            }
        }

        tracing::debug!(field = id, "field changed");
        self.notify(&change);
        Ok(change)
    }

    /// Replace the text of a text field
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<StateChange> {
        self.set_field_value(id, FieldValue::Text(text.into()))
    }

    /// Pick an option of a radio button or dropdown
    pub fn select_option(&mut self, id: &str, option_value: &str) -> Result<StateChange> {
        self.check_option(id, option_value)?;
        self.set_field_value(id, FieldValue::Text(option_value.to_string()))
    }

    /// Check or uncheck an option of a checkbox field
    pub fn toggle_option(&mut self, id: &str, option_value: &str) -> Result<StateChange> {
        self.check_option(id, option_value)?;
        let mut selected = self
            .value(id)
            .map(|v| v.as_selection().to_vec())
            .unwrap_or_default();
        if let Some(pos) = selected.iter().position(|v| v == option_value) {
            selected.remove(pos);
        } else {
            selected.push(option_value.to_string());
        }
        self.set_field_value(id, FieldValue::Selection(selected))
    }

    /// Reset a radio button or dropdown to nothing picked
    pub fn clear_selection(&mut self, id: &str) -> Result<StateChange> {
        self.set_field_value(id, FieldValue::Unset)
    }

    fn check_option(&self, id: &str, option_value: &str) -> Result<()> {
        let field = self
            .field(id)
            .ok_or_else(|| PopupError::UnknownField(id.to_string()))?;
        if field.field_type.is_text() || field.option_by_value(option_value).is_none() {
            return Err(PopupError::UnknownOption {
                field: id.to_string(),
                value: option_value.to_string(),
            });
        }
        Ok(())
    }

    /// Validate all visible fields and record the result on the form.
    ///
    /// Hidden fields are reset to no error.
    pub fn validate(&mut self) -> ValidationReport {
        let report = validate(self.content.fields(), &self.responses);

        let mut change = StateChange::default();
        for field in self.content.fields() {
            let has_error = report.has_error(field.id());
            if self.errors.insert(field.id().to_string(), has_error) != Some(has_error) {
                change.errors.push(field.id().to_string());
            }
        }
        self.first_invalid = report.first_invalid.clone();

        if let Some(first) = &report.first_invalid {
            tracing::info!(first_invalid = first.as_str(), "form has validation errors");
        }
        self.notify(&change);
        report
    }

    /// Field type of `id`, if it exists
    pub fn field_type(&self, id: &str) -> Option<FieldType> {
        self.field(id).map(|f| f.field_type)
    }
}
