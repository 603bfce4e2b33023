//! Output Reconciler — turns raw task outputs into an `AggregateReport`.
//!
//! Best effort by construction: every output that cannot be used is skipped
//! with a `ReconciliationWarning`, and `reconcile` itself cannot fail.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::crew::tasks::TaskId;
use crate::orchestrator::models::{RunResult, TaskResult};

pub const JOB_ANALYSIS_SECTION: &str = "job_analysis";
pub const RESUME_OPTIMIZATION_SECTION: &str = "resume_optimization";
pub const COMPANY_RESEARCH_SECTION: &str = "company_research";
pub const UNCLASSIFIED_SECTION: &str = "unclassified";

/// Agent role substring → report section. First match wins.
const ROLE_SECTIONS: &[(&str, &str)] = &[
    ("Job Requirements Analyst", JOB_ANALYSIS_SECTION),
    ("Resume Optimization Specialist", RESUME_OPTIMIZATION_SECTION),
    ("Company Research Specialist", COMPANY_RESEARCH_SECTION),
];

const JSON_FENCE_OPENER: &str = "```json";
const FENCE: &str = "```";

/// A parsed task output: string keys to JSON values.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// The task itself failed, so there was nothing to parse.
    TaskFailed,
    /// Neither a ```json fence nor a bare `{` at the start.
    NotJson,
    /// Looked like JSON but did not parse.
    InvalidJson { message: String },
    /// Parsed, but the top level is not an object.
    NotAnObject,
    /// A later output replaced an earlier one for the same section.
    SectionReplaced { section: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationWarning {
    pub task_id: TaskId,
    pub agent_role: String,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for ReconciliationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' ({}): ", self.task_id, self.agent_role)?;
        match &self.kind {
            WarningKind::TaskFailed => write!(f, "task failed, no output to parse"),
            WarningKind::NotJson => write!(f, "output is not JSON, skipped"),
            WarningKind::InvalidJson { message } => write!(f, "could not parse JSON: {message}"),
            WarningKind::NotAnObject => write!(f, "JSON output is not an object, skipped"),
            WarningKind::SectionReplaced { section } => {
                write!(f, "replaced earlier output for section '{section}'")
            }
        }
    }
}

/// Section name → parsed record. `unclassified` nests one record per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateReport {
    sections: BTreeMap<String, Record>,
}

impl AggregateReport {
    pub fn section(&self, name: &str) -> Option<&Record> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> &BTreeMap<String, Record> {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns true when an existing record was replaced.
    fn insert(&mut self, section: &str, record: Record) -> bool {
        self.sections.insert(section.to_string(), record).is_some()
    }

    /// Returns true when an existing record for the role was replaced.
    fn insert_unclassified(&mut self, role: &str, record: Record) -> bool {
        self.sections
            .entry(UNCLASSIFIED_SECTION.to_string())
            .or_default()
            .insert(role.to_string(), Value::Object(record))
            .is_some()
    }
}

impl FromIterator<(String, Record)> for AggregateReport {
    fn from_iter<I: IntoIterator<Item = (String, Record)>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

/// The report plus everything that was skipped on the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    pub report: AggregateReport,
    pub warnings: Vec<ReconciliationWarning>,
}

/// Maps an agent role to its report section, or `None` for unclassified roles.
pub fn section_for_role(role: &str) -> Option<&'static str> {
    ROLE_SECTIONS
        .iter()
        .find(|(needle, _)| role.contains(needle))
        .map(|(_, section)| *section)
}

/// Returns the JSON text inside `raw`, or `None` if it does not look like JSON.
///
/// A leading ```` ```json ```` fence is stripped together with its closing
/// fence; an output starting with `{` is taken whole. Anything else is prose.
pub fn extract_json_payload(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix(JSON_FENCE_OPENER) {
        let rest = rest.trim();
        let body = rest.strip_suffix(FENCE).unwrap_or(rest);
        return Some(body.trim());
    }
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }
    None
}

/// Parses one task output into a record.
pub fn parse_record(raw: &str) -> Result<Record, WarningKind> {
    let payload = extract_json_payload(raw).ok_or(WarningKind::NotJson)?;
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(WarningKind::NotAnObject),
        Err(e) => Err(WarningKind::InvalidJson {
            message: e.to_string(),
        }),
    }
}

pub fn reconcile(run: &RunResult) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();
    for result in &run.tasks {
        reconcile_one(result, &mut reconciliation);
    }
    debug!(
        "Reconciled {} task outputs into {} sections ({} warnings)",
        run.len(),
        reconciliation.report.sections.len(),
        reconciliation.warnings.len()
    );
    reconciliation
}

fn reconcile_one(result: &TaskResult, into: &mut Reconciliation) {
    if !result.succeeded {
        push_warning(&mut into.warnings, result, WarningKind::TaskFailed);
        return;
    }

    let record = match parse_record(&result.raw_output) {
        Ok(record) => record,
        Err(kind) => {
            push_warning(&mut into.warnings, result, kind);
            return;
        }
    };

    let (section, replaced) = match section_for_role(&result.agent_role) {
        Some(section) => (section, into.report.insert(section, record)),
        None => (
            UNCLASSIFIED_SECTION,
            into.report.insert_unclassified(&result.agent_role, record),
        ),
    };
    if replaced {
        push_warning(
            &mut into.warnings,
            result,
            WarningKind::SectionReplaced {
                section: section.to_string(),
            },
        );
    }
}

fn push_warning(warnings: &mut Vec<ReconciliationWarning>, result: &TaskResult, kind: WarningKind) {
    let warning = ReconciliationWarning {
        task_id: result.task_id.clone(),
        agent_role: result.agent_role.clone(),
        kind,
    };
    warn!("Reconciliation: {warning}");
    warnings.push(warning);
}
