// Cross-cutting prompt fragments and the persona/task prompt builders.

use crate::crew::agents::AgentDescriptor;

/// System prompt fragment asking for JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Turns a persona into the system prompt for its calls.
pub fn persona_system_prompt(agent: &AgentDescriptor) -> String {
    let mut system = format!("You are the {}.\nYour goal: {}", agent.role(), agent.goal());
    if !agent.context().is_empty() {
        system.push_str("\n\n");
        system.push_str(agent.context());
    }
    if !agent.allow_delegation() {
        system.push_str("\n\nComplete the task yourself; do not delegate it.");
    }
    system.push_str("\n\n");
    system.push_str(JSON_ONLY_SYSTEM);
    system
}

/// The user message: the task's effective prompt followed by its output hint.
pub fn task_prompt(effective_prompt: &str, expected_output: &str) -> String {
    if expected_output.trim().is_empty() {
        return effective_prompt.to_string();
    }
    format!("{effective_prompt}\n\nEXPECTED OUTPUT:\n{}", expected_output.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::agents::AgentKind;

    #[test]
    fn test_persona_system_prompt_carries_role_goal_context() {
        let agent = AgentDescriptor::for_kind(AgentKind::ResumeAnalyzer).unwrap();
        let system = persona_system_prompt(&agent);
        assert!(system.starts_with("You are the Resume Optimization Specialist."));
        assert!(system.contains(agent.goal()));
        assert!(system.contains("ATS optimization"));
        assert!(system.contains("do not delegate"));
        assert!(system.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_delegating_persona_without_context() {
        let agent = AgentDescriptor::new("Scout", "Find things", "", true).unwrap();
        let system = persona_system_prompt(&agent);
        assert_eq!(
            system,
            format!("You are the Scout.\nYour goal: Find things\n\n{JSON_ONLY_SYSTEM}")
        );
    }

    #[test]
    fn test_task_prompt_appends_expected_output() {
        assert_eq!(
            task_prompt("Do it.", "  - job_title: string \n"),
            "Do it.\n\nEXPECTED OUTPUT:\n- job_title: string"
        );
        assert_eq!(task_prompt("Do it.", "   "), "Do it.");
    }
}
