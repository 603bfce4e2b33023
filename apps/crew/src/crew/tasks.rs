//! Task descriptors and the validated plan the orchestrator executes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crew::agents::{AgentDescriptor, AgentError, AgentKind};
use crate::crew::prompts::{
    COMPANY_RESEARCH_EXPECTED_OUTPUT, COMPANY_RESEARCH_TEMPLATE, JOB_ANALYSIS_EXPECTED_OUTPUT,
    JOB_ANALYSIS_TEMPLATE, RESUME_OPTIMIZATION_EXPECTED_OUTPUT, RESUME_OPTIMIZATION_TEMPLATE,
};
use crate::extract::ExtractedText;

pub const JOB_ANALYSIS_TASK: &str = "job_analysis";
pub const RESUME_OPTIMIZATION_TASK: &str = "resume_optimization";
pub const COMPANY_RESEARCH_TASK: &str = "company_research";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Duplicate task id '{0}'")]
    DuplicateTaskId(TaskId),

    #[error("Task '{task}' depends on '{dependency}', which is not scheduled before it")]
    DependencyNotScheduledEarlier { task: TaskId, dependency: TaskId },

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// One unit of work: an instruction bound to a persona.
///
/// `expected_output` is only ever a prompt hint; nothing checks the output
/// against it. Outputs of `depends_on` tasks are appended to the prompt in
/// the order listed here.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    pub id: TaskId,
    pub description: String,
    pub expected_output: String,
    pub agent: Arc<AgentDescriptor>,
    pub depends_on: Vec<TaskId>,
}

impl TaskDescriptor {
    pub fn new(
        id: impl Into<TaskId>,
        agent: Arc<AgentDescriptor>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, dependency: impl Into<TaskId>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }
}

/// An ordered task list whose dependency edges all point backwards.
///
/// The order is caller-chosen and already topological; this only rejects
/// lists that break that promise, it never reorders.
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    tasks: Vec<TaskDescriptor>,
}

impl TaskPlan {
    pub fn new(tasks: Vec<TaskDescriptor>) -> Result<Self, PlanError> {
        let mut scheduled: HashSet<&TaskId> = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            for dependency in &task.depends_on {
                if !scheduled.contains(dependency) {
                    return Err(PlanError::DependencyNotScheduledEarlier {
                        task: task.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            if !scheduled.insert(&task.id) {
                return Err(PlanError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in tasks
// ────────────────────────────────────────────────────────────────────────────

pub fn job_analysis_task(
    agent: Arc<AgentDescriptor>,
    job: &ExtractedText,
    company_name: &str,
) -> TaskDescriptor {
    let description = JOB_ANALYSIS_TEMPLATE
        .replace("{company_name}", company_name)
        .replace("{job_url}", &job.source)
        .replace("{job_text}", &job.content);
    TaskDescriptor::new(
        JOB_ANALYSIS_TASK,
        agent,
        description,
        JOB_ANALYSIS_EXPECTED_OUTPUT,
    )
}

/// Consumes the job analysis output as context.
pub fn resume_optimization_task(
    agent: Arc<AgentDescriptor>,
    resume: &ExtractedText,
    company_name: &str,
) -> TaskDescriptor {
    let description = RESUME_OPTIMIZATION_TEMPLATE
        .replace("{company_name}", company_name)
        .replace("{resume_source}", &resume.source)
        .replace("{resume_text}", &resume.content);
    TaskDescriptor::new(
        RESUME_OPTIMIZATION_TASK,
        agent,
        description,
        RESUME_OPTIMIZATION_EXPECTED_OUTPUT,
    )
    .depends_on(JOB_ANALYSIS_TASK)
}

/// Independent of the other tasks, so it can fan out in parallel mode.
pub fn company_research_task(agent: Arc<AgentDescriptor>, company_name: &str) -> TaskDescriptor {
    let description = COMPANY_RESEARCH_TEMPLATE.replace("{company_name}", company_name);
    TaskDescriptor::new(
        COMPANY_RESEARCH_TASK,
        agent,
        description,
        COMPANY_RESEARCH_EXPECTED_OUTPUT,
    )
}

/// Job analysis → resume optimization, optionally followed by company research.
pub fn standard_plan(
    job: &ExtractedText,
    resume: &ExtractedText,
    company_name: &str,
    include_company_research: bool,
) -> Result<TaskPlan, PlanError> {
    let mut tasks = vec![
        job_analysis_task(
            Arc::new(AgentDescriptor::for_kind(AgentKind::JobAnalyzer)?),
            job,
            company_name,
        ),
        resume_optimization_task(
            Arc::new(AgentDescriptor::for_kind(AgentKind::ResumeAnalyzer)?),
            resume,
            company_name,
        ),
    ];
    if include_company_research {
        tasks.push(company_research_task(
            Arc::new(AgentDescriptor::for_kind(AgentKind::CompanyResearcher)?),
            company_name,
        ));
    }
    TaskPlan::new(tasks)
}
