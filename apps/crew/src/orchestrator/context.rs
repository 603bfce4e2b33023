//! Effective prompt assembly: a task's description plus its upstream outputs.
//!
//! Kept free of I/O so the data flow between tasks can be checked without a
//! generator.

use crate::crew::tasks::TaskDescriptor;
use crate::orchestrator::models::TaskResult;

/// Appends each upstream result under a labelled header, in `depends_on`
/// order. A failed upstream contributes a note instead of its (empty) output.
pub fn build_effective_prompt(task: &TaskDescriptor, upstream: &[&TaskResult]) -> String {
    let mut prompt = task.description.trim_end().to_string();
    if upstream.is_empty() {
        return prompt;
    }

    prompt.push_str("\n\nCONTEXT FROM PREVIOUS TASKS:");
    for result in upstream {
        if result.succeeded {
            prompt.push_str(&format!(
                "\n\n### Output of task '{}' ({})\n{}",
                result.task_id,
                result.agent_role,
                result.raw_output.trim()
            ));
        } else {
            prompt.push_str(&format!(
                "\n\n### Output of task '{}' ({}) is unavailable: {}",
                result.task_id,
                result.agent_role,
                result.error.as_deref().unwrap_or("task failed")
            ));
        }
    }
    prompt
}
