//! Completion sink used by the terminal renderer
//!
//! Keeps the submitted payload so it can be printed once the terminal is
//! restored, and optionally writes it to a file as pretty JSON.

use super::traits::CompletionHandler;
use crate::state::SubmissionPayload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// How the form ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Submitted(SubmissionPayload),
    Dismissed,
}

/// Collects the outcome of a form
#[derive(Debug, Default)]
pub struct CompletionSink {
    /// Write the payload here instead of leaving it for stdout
    output_path: Option<PathBuf>,
    outcome: Option<Completion>,
}

impl CompletionSink {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            outcome: None,
        }
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    pub fn outcome(&self) -> Option<&Completion> {
        self.outcome.as_ref()
    }

    pub fn take_outcome(&mut self) -> Option<Completion> {
        self.outcome.take()
    }

    /// Payload as pretty JSON
    pub fn render(payload: &SubmissionPayload) -> Result<String> {
        Ok(serde_json::to_string_pretty(payload)?)
    }
}

#[async_trait]
impl CompletionHandler for CompletionSink {
    async fn completed(&mut self, payload: SubmissionPayload) -> Result<()> {
        if let Some(path) = &self.output_path {
            let json = Self::render(&payload)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write answers to {}", path.display()))?;
            tracing::info!("answers written to {}", path.display());
        }
        self.outcome = Some(Completion::Submitted(payload));
        Ok(())
    }

    fn dismissed(&mut self) {
        self.outcome = Some(Completion::Dismissed);
    }
}
