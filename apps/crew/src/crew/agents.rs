//! Agent personas. Each is an immutable record picked from a closed set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("Agent role must not be empty")]
    EmptyRole,

    #[error("Agent goal must not be empty (role '{0}')")]
    EmptyGoal(String),
}

/// The personas this crew knows how to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    JobAnalyzer,
    ResumeAnalyzer,
    CompanyResearcher,
}

/// A persona guiding one generation call. The role doubles as its identity
/// for output attribution, so two descriptors with the same role are the
/// same agent as far as reconciliation is concerned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDescriptor {
    role: String,
    goal: String,
    context: String,
    allow_delegation: bool,
}

impl AgentDescriptor {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        context: impl Into<String>,
        allow_delegation: bool,
    ) -> Result<Self, AgentError> {
        let role = role.into().trim().to_string();
        let goal = goal.into().trim().to_string();
        if role.is_empty() {
            return Err(AgentError::EmptyRole);
        }
        if goal.is_empty() {
            return Err(AgentError::EmptyGoal(role));
        }
        Ok(Self {
            role,
            goal,
            context: context.into().trim().to_string(),
            allow_delegation,
        })
    }

    /// Factory for the built-in personas.
    pub fn for_kind(kind: AgentKind) -> Result<Self, AgentError> {
        let (role, goal, context) = match kind {
            AgentKind::JobAnalyzer => (
                "Job Requirements Analyst",
                "Extract and analyze job requirements, skills, and qualifications from job postings",
                "You are an expert HR analyst with 10+ years of experience in job market \
                 analysis and recruitment. You specialize in understanding job requirements \
                 and matching them with candidate profiles.",
            ),
            AgentKind::ResumeAnalyzer => (
                "Resume Optimization Specialist",
                "Analyze resume match with job requirements and suggest specific improvements",
                "You are a certified resume writer and career coach with expertise in ATS \
                 optimization. You have helped thousands of candidates improve their resumes \
                 and land their dream jobs.",
            ),
            AgentKind::CompanyResearcher => (
                "Company Research Specialist",
                "Research companies and provide insights for interview preparation",
                "You are a business analyst and market researcher with deep knowledge of \
                 various industries and companies. You help candidates understand company \
                 culture, values, and interview preparation strategies.",
            ),
        };

        Self::new(role, goal, context, false)
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }
}
