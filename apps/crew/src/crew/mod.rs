// Crew definition: agent personas, task descriptors, and their prompt templates.

pub mod agents;
pub mod prompts;
pub mod tasks;
