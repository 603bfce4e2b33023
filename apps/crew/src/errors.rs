use thiserror::Error;

use crate::crew::tasks::PlanError;
use crate::extract::ExtractionError;
use crate::output::PersistenceError;

/// Run-level error type.
///
/// Only precondition failures land here. Generation failures become failed
/// `TaskResult`s and malformed output becomes a `ReconciliationWarning`, so
/// neither ever aborts a run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid task plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Human-readable hint printed by the CLI alongside the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Extraction(ExtractionError::FileNotFound { .. }) => {
                Some("Please place your resume in the knowledge/ directory")
            }
            AppError::Extraction(ExtractionError::UnsupportedFormat { .. }) => {
                Some("Supported formats: .pdf, .txt, .md")
            }
            AppError::Extraction(ExtractionError::Network { .. }) => {
                Some("Check the job posting URL and your network connection")
            }
            _ => None,
        }
    }
}
