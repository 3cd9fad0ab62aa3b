//! Submission coordinator: validate, serialize, hand off, close

use super::field::{Field, FieldType};
use super::form_state::{FormState, StateChange};
use super::responses::FieldValue;
use crate::completion::CompletionHandler;
use crate::error::PopupError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the form is in its submit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Closed,
}

/// Answers handed to the completion callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_id: String,
    /// Every field's value; `None` for choices nobody picked
    pub values: BTreeMap<String, Option<String>>,
    pub submitted_at: DateTime<Utc>,
    pub completed: bool,
}

/// Result of a submit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the form stays open
    Invalid { first_invalid: String },
    /// Callback succeeded and the form is closed
    Submitted,
    /// Serialization or the callback failed; a retry is allowed
    Failed(PopupError),
    /// A submission is already running or the form is closed
    Ignored,
}

impl SubmitOutcome {
    /// The error behind a rejected or failed submit
    pub fn error(&self) -> Option<PopupError> {
        match self {
            SubmitOutcome::Invalid { first_invalid } => Some(PopupError::ValidationFailure {
                first_invalid: first_invalid.clone(),
            }),
            SubmitOutcome::Failed(err) => Some(err.clone()),
            SubmitOutcome::Submitted | SubmitOutcome::Ignored => None,
        }
    }
}

/// First half of a split submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    /// Valid; await the callback with this payload, then call `finish_submit`
    Proceed(SubmissionPayload),
    Stop(SubmitOutcome),
}

/// Per-type transform applied before handing a value to the callback
pub fn prepare_value(field: &Field, value: &FieldValue) -> Option<String> {
    match (field.field_type, value) {
        (FieldType::Checkbox, FieldValue::Selection(_)) => value.to_scalar(),
        (_, FieldValue::Unset) => None,
        (_, other) => other.to_scalar(),
    }
}

impl FormState {
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SubmissionPhase::Closed
    }

    /// User-facing message from the last failed submission
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn clear_submission_error(&mut self) {
        self.submission_error = None;
    }

    fn set_phase(&mut self, phase: SubmissionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.notify(&StateChange {
                phase: Some(phase),
                ..StateChange::default()
            });
        }
    }

    /// Serialize every field's current value, visible or not
    pub fn build_payload(&self) -> Result<SubmissionPayload, PopupError> {
        let mut values = BTreeMap::new();
        for field in self.fields() {
            let value = self.responses.get(field.id()).ok_or_else(|| {
                PopupError::SubmissionFailure(format!("no response for field '{}'", field.id()))
            })?;
            values.insert(field.id().to_string(), prepare_value(field, value));
        }
        Ok(SubmissionPayload {
            form_id: self.form_id.clone(),
            values,
            submitted_at: Utc::now(),
            completed: true,
        })
    }

    /// Validate and, when valid, move to `Submitting` and return the payload.
    /// A request while already submitting or closed does nothing.
    pub fn begin_submit(&mut self) -> SubmitStep {
        if matches!(self.phase, SubmissionPhase::Submitting | SubmissionPhase::Closed) {
            tracing::debug!(phase = ?self.phase, "submit ignored");
            return SubmitStep::Stop(SubmitOutcome::Ignored);
        }

        self.submission_error = None;
        self.set_phase(SubmissionPhase::Validating);
        let report = self.validate();
        if let Some(first_invalid) = report.first_invalid {
            self.set_phase(SubmissionPhase::Idle);
            return SubmitStep::Stop(SubmitOutcome::Invalid { first_invalid });
        }

        match self.build_payload() {
            Ok(payload) => {
                self.set_phase(SubmissionPhase::Submitting);
                SubmitStep::Proceed(payload)
            }
            Err(err) => SubmitStep::Stop(self.fail(err)),
        }
    }

    /// Record the callback's result. Success closes the form; failure
    /// returns it to idle with a user-visible message.
    pub fn finish_submit(&mut self, result: anyhow::Result<()>) -> SubmitOutcome {
        if self.phase != SubmissionPhase::Submitting {
            return SubmitOutcome::Ignored;
        }
        match result {
            Ok(()) => {
                tracing::info!(form = self.form_id.as_str(), "form submitted");
                self.set_phase(SubmissionPhase::Closed);
                SubmitOutcome::Submitted
            }
            Err(err) => self.fail(PopupError::SubmissionFailure(format!("{err:#}"))),
        }
    }

    fn fail(&mut self, err: PopupError) -> SubmitOutcome {
        tracing::error!("Error submitting form: {err}");
        self.submission_error = Some(err.user_message());
        self.set_phase(SubmissionPhase::Idle);
        SubmitOutcome::Failed(err)
    }

    /// Run the whole submission against `handler`
    pub async fn submit(&mut self, handler: &mut dyn CompletionHandler) -> SubmitOutcome {
        match self.begin_submit() {
            SubmitStep::Stop(outcome) => outcome,
            SubmitStep::Proceed(payload) => {
                let result = handler.completed(payload).await;
                self.finish_submit(result)
            }
        }
    }

    /// Close without submitting. Refused for blocking forms and while a
    /// submission is running.
    pub fn dismiss(&mut self, handler: &mut dyn CompletionHandler) -> bool {
        if self.is_blocking() || self.phase != SubmissionPhase::Idle {
            return false;
        }
        tracing::info!(form = self.form_id.as_str(), "form dismissed");
        self.set_phase(SubmissionPhase::Closed);
        handler.dismissed();
        true
    }
}
