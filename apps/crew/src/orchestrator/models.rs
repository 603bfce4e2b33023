use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crew::tasks::TaskId;

/// How the orchestrator schedules a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One call at a time, in submission order.
    Sequential,
    /// Independent tasks of the same dependency depth run together, at most
    /// `max_concurrent` calls in flight.
    Parallel { max_concurrent: usize },
}

impl ExecutionMode {
    /// `1` means sequential; anything larger enables bounded fan-out.
    pub fn from_max_parallel(max_parallel: usize) -> Self {
        if max_parallel <= 1 {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel {
                max_concurrent: max_parallel,
            }
        }
    }
}

/// Outcome of one task. `raw_output` is the generator's text verbatim and is
/// empty when the task failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub agent_role: String,
    pub raw_output: String,
    pub succeeded: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl TaskResult {
    pub fn success(task_id: TaskId, agent_role: &str, raw_output: String, duration_ms: u64) -> Self {
        Self {
            task_id,
            agent_role: agent_role.to_string(),
            raw_output,
            succeeded: true,
            error: None,
            duration_ms,
        }
    }

    pub fn failure(task_id: TaskId, agent_role: &str, error: String, duration_ms: u64) -> Self {
        Self {
            task_id,
            agent_role: agent_role.to_string(),
            raw_output: String::new(),
            succeeded: false,
            error: Some(error),
            duration_ms,
        }
    }
}

/// One entry per submitted task, always in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tasks: Vec<TaskResult>,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn failed_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.succeeded).count()
    }
}
