//! Artifact Writer — persists the run for later inspection.
//!
//! `complete_analysis.json` holds the structured data (`run`, `report`,
//! `warnings`); `final_report.md` holds the rendered Markdown. Both are
//! overwritten on every run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::RunResult;
use crate::reconcile::{AggregateReport, Reconciliation, ReconciliationWarning};

pub const ANALYSIS_FILE: &str = "complete_analysis.json";
pub const REPORT_FILE: &str = "final_report.md";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct AnalysisDocument<'a> {
    run: &'a RunResult,
    report: &'a AggregateReport,
    warnings: &'a [ReconciliationWarning],
}

/// Paths of the files written by [`write_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub analysis: PathBuf,
    pub report: PathBuf,
}

pub async fn write_artifacts(
    dir: &Path,
    run: &RunResult,
    reconciliation: &Reconciliation,
    markdown: &str,
) -> Result<ArtifactPaths, PersistenceError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PersistenceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let document = AnalysisDocument {
        run,
        report: &reconciliation.report,
        warnings: &reconciliation.warnings,
    };
    let json = serde_json::to_string_pretty(&document)?;

    let paths = ArtifactPaths {
        analysis: dir.join(ANALYSIS_FILE),
        report: dir.join(REPORT_FILE),
    };
    write_file(&paths.analysis, json.as_bytes()).await?;
    write_file(&paths.report, markdown.as_bytes()).await?;

    tracing::info!(
        analysis = %paths.analysis.display(),
        report = %paths.report.display(),
        "Artifacts written"
    );
    Ok(paths)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })
}
