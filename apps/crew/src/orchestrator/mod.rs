//! Orchestrator — runs a `TaskPlan` against the generation capability.
//!
//! Flow per task: resolve upstream results → build effective prompt →
//! generate (one attempt, bounded by the run deadline) → record `TaskResult`.
//!
//! A failing task never aborts the run. The returned `RunResult` always holds
//! exactly one result per planned task, in submission order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crew::tasks::{TaskDescriptor, TaskPlan};
use crate::llm_client::{GenerationRequest, Generator};

pub mod context;
pub mod models;

pub use context::build_effective_prompt;
pub use models::{ExecutionMode, RunResult, TaskResult};

pub struct Orchestrator {
    generator: Arc<dyn Generator>,
    mode: ExecutionMode,
    run_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            mode: ExecutionMode::Sequential,
            run_timeout: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Deadline for the whole run, not per task.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    pub async fn run(&self, plan: &TaskPlan) -> RunResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let deadline = self.run_timeout.map(|t| Instant::now() + t);

        info!(
            "Run {} starting: {} tasks, mode={:?}",
            run_id,
            plan.len(),
            self.mode
        );

        let mut slots: Vec<Option<TaskResult>> = vec![None; plan.len()];
        match self.mode {
            ExecutionMode::Sequential => self.run_sequential(plan, deadline, &mut slots).await,
            ExecutionMode::Parallel { max_concurrent } => {
                self.run_parallel(plan, deadline, max_concurrent, &mut slots)
                    .await
            }
        }

        // Every slot is filled by either branch; the fallback only guards the
        // length guarantee.
        let tasks: Vec<TaskResult> = slots
            .into_iter()
            .zip(plan.tasks())
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| {
                    TaskResult::failure(
                        task.id.clone(),
                        task.agent.role(),
                        "task was never scheduled".to_string(),
                        0,
                    )
                })
            })
            .collect();

        let run = RunResult {
            run_id,
            mode: self.mode,
            started_at,
            finished_at: Utc::now(),
            tasks,
        };

        info!(
            "Run {} finished: {}/{} tasks succeeded",
            run_id,
            run.len() - run.failed_count(),
            run.len()
        );
        run
    }

    async fn run_sequential(
        &self,
        plan: &TaskPlan,
        deadline: Option<Instant>,
        slots: &mut [Option<TaskResult>],
    ) {
        for (position, task) in plan.tasks().iter().enumerate() {
            let upstream = resolve_upstream(task, plan, slots);
            let result = self.execute_task(task, &upstream, deadline).await;
            slots[position] = Some(result);
        }
    }

    /// Runs the plan in dependency waves. Each wave only depends on earlier
    /// waves, so nothing ever reads an in-flight result; `join_all` is the
    /// barrier between waves.
    async fn run_parallel(
        &self,
        plan: &TaskPlan,
        deadline: Option<Instant>,
        max_concurrent: usize,
        slots: &mut [Option<TaskResult>],
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        for (depth, wave) in dependency_waves(plan).into_iter().enumerate() {
            debug!("Wave {depth}: {} tasks", wave.len());

            let completed: &[Option<TaskResult>] = &*slots;
            let futures: Vec<_> = wave
                .iter()
                .map(|&position| {
                    let task = &plan.tasks()[position];
                    let upstream = resolve_upstream(task, plan, completed);
                    let sem = Arc::clone(&semaphore);
                    async move {
                        let result = match sem.acquire().await {
                            Ok(_permit) => self.execute_task(task, &upstream, deadline).await,
                            Err(_) => TaskResult::failure(
                                task.id.clone(),
                                task.agent.role(),
                                "concurrency limiter closed".to_string(),
                                0,
                            ),
                        };
                        (position, result)
                    }
                })
                .collect();

            let finished = join_all(futures).await;
            for (position, result) in finished {
                slots[position] = Some(result);
            }
        }
    }

    async fn execute_task(
        &self,
        task: &TaskDescriptor,
        upstream: &[&TaskResult],
        deadline: Option<Instant>,
    ) -> TaskResult {
        let role = task.agent.role();
        let started = Instant::now();

        if deadline.is_some_and(|d| started >= d) {
            warn!("Task {} skipped: run deadline already passed", task.id);
            return TaskResult::failure(
                task.id.clone(),
                role,
                "run timed out before the task started".to_string(),
                0,
            );
        }

        let prompt = build_effective_prompt(task, upstream);
        let request = GenerationRequest {
            agent: &task.agent,
            prompt: &prompt,
            expected_output: &task.expected_output,
        };

        info!("Task {} started (agent: {})", task.id, role);

        let outcome = match deadline {
            Some(d) => tokio::time::timeout_at(d, self.generator.generate(request))
                .await
                .map_err(|_| "run timed out while the task was in flight".to_string())
                .and_then(|r| r.map_err(|e| e.to_string())),
            None => self
                .generator
                .generate(request)
                .await
                .map_err(|e| e.to_string()),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(raw_output) => {
                info!(
                    "Task {} completed in {}ms ({} chars)",
                    task.id,
                    duration_ms,
                    raw_output.len()
                );
                TaskResult::success(task.id.clone(), role, raw_output, duration_ms)
            }
            Err(error) => {
                warn!("Task {} failed after {}ms: {}", task.id, duration_ms, error);
                TaskResult::failure(task.id.clone(), role, error, duration_ms)
            }
        }
    }
}

/// Finished results for `task.depends_on`, in dependency order.
fn resolve_upstream<'a>(
    task: &TaskDescriptor,
    plan: &TaskPlan,
    slots: &'a [Option<TaskResult>],
) -> Vec<&'a TaskResult> {
    task.depends_on
        .iter()
        .filter_map(|id| plan.position(id).and_then(|i| slots[i].as_ref()))
        .collect()
}

/// Groups task positions by dependency depth (0 = no dependencies), keeping
/// submission order inside each wave.
fn dependency_waves(plan: &TaskPlan) -> Vec<Vec<usize>> {
    let mut depths: Vec<usize> = Vec::with_capacity(plan.len());
    for task in plan.tasks() {
        let depth = task
            .depends_on
            .iter()
            .filter_map(|id| plan.position(id).map(|i| depths[i] + 1))
            .max()
            .unwrap_or(0);
        depths.push(depth);
    }

    let wave_count = depths.iter().max().map_or(0, |d| d + 1);
    let mut waves = vec![Vec::new(); wave_count];
    for (position, depth) in depths.into_iter().enumerate() {
        waves[depth].push(position);
    }
    waves
}
