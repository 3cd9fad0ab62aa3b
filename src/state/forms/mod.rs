//! Form domain layer
//!
//! This module provides the field model and the live form:
//! - `field`: typed field descriptors and conditional logic
//! - `responses`: the response store
//! - `evaluator`: visibility and requiredness
//! - `validator`: per-field validation
//! - `form_state`: the form instance and its change observers
//! - `submission`: the submit/dismiss lifecycle

mod evaluator;
mod field;
mod form_state;
mod responses;
mod submission;
mod validator;

pub use evaluator::{evaluate, is_required, is_visible, Evaluation};
pub use field::{Condition, ConditionalLogic, Field, FieldOption, FieldType, DEFAULT_LABEL};
pub use form_state::{FormState, StateChange, SubscriptionId};
pub use responses::{FieldValue, ResponseStore, SELECTION_DELIMITER};
pub use submission::{prepare_value, SubmissionPayload, SubmissionPhase, SubmitOutcome, SubmitStep};
pub use validator::{validate, validate_field, ValidationReport};
