//! Trait abstraction for the completion callback to enable mocking in tests

use crate::state::SubmissionPayload;
use anyhow::Result;
use async_trait::async_trait;

/// Receives the outcome of a form: the submitted answers, or a dismissal
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionHandler: Send {
    /// Called once with the serialized answers; an error keeps the form open
    async fn completed(&mut self, payload: SubmissionPayload) -> Result<()>;

    /// Called when a non-blocking form is closed without submitting
    fn dismissed(&mut self);
}
