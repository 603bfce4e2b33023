//! Report Renderer — `AggregateReport` → Markdown.
//!
//! Pure and deterministic: the same report and header always produce the same
//! bytes. Absent fields render as placeholders, never as missing sections.

use chrono::NaiveDate;
use serde_json::Value;

use crate::reconcile::{
    AggregateReport, Record, COMPANY_RESEARCH_SECTION, JOB_ANALYSIS_SECTION,
    RESUME_OPTIMIZATION_SECTION, UNCLASSIFIED_SECTION,
};

pub const NOT_AVAILABLE: &str = "Information not available";
pub const NO_SCORE: &str = "N/A";
pub const NO_GAPS: &str = "No specific gaps identified";
pub const NO_ACTIONS: &str = "No specific actions identified";

/// (label, key inside `match_scores`)
const SCORE_ROWS: &[(&str, &str)] = &[
    ("Technical Skills", "technical_skills"),
    ("Experience Relevance", "experience_relevance"),
    ("Education Requirements", "education_requirements"),
    ("Overall Fit", "overall_fit"),
];

/// Run facts that are not produced by any agent.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub candidate_name: String,
    pub company_name: String,
    pub position_title: String,
    pub analysis_date: NaiveDate,
}

/// Status label for a 0-100 score. Non-numeric values are "N/A".
pub fn status_label(score: &Value) -> &'static str {
    match score.as_f64() {
        Some(s) if s >= 80.0 => "Excellent",
        Some(s) if s >= 70.0 => "Strong",
        Some(s) if s >= 60.0 => "Good",
        Some(_) => "Needs Improvement",
        None => NO_SCORE,
    }
}

pub fn render_markdown(report: &AggregateReport, header: &ReportHeader) -> String {
    let job = report.section(JOB_ANALYSIS_SECTION);
    let resume = report.section(RESUME_OPTIMIZATION_SECTION);
    let company = report.section(COMPANY_RESEARCH_SECTION);
    let scores = resume.and_then(|r| r.get("match_scores"));

    let mut out = String::new();

    out.push_str(&format!(
        "# Resume Analysis Report: {} vs {}\n\n",
        header.candidate_name, header.position_title
    ));

    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!("**Candidate:** {}  \n", header.candidate_name));
    out.push_str(&format!("**Target Position:** {}  \n", header.position_title));
    out.push_str(&format!("**Company:** {}  \n", header.company_name));
    out.push_str(&format!(
        "**Analysis Date:** {}  \n",
        header.analysis_date.format("%B %d, %Y")
    ));
    out.push_str(&format!(
        "**Overall Match Score:** {}\n\n---\n\n",
        format_score(scores.and_then(|s| s.get("overall_fit")))
    ));

    out.push_str("## Job Analysis\n\n### Position Details\n");
    out.push_str(&format!("- **Title:** {}\n", text_or(job, "job_title", NOT_AVAILABLE)));
    out.push_str(&format!(
        "- **Experience Required:** {}\n",
        text_or(job, "required_experience", NOT_AVAILABLE)
    ));
    out.push_str(&format!(
        "- **Salary Range:** {}\n\n",
        text_or(job, "salary_range", NOT_AVAILABLE)
    ));
    out.push_str("### Key Requirements\n\n#### Required Skills\n");
    out.push_str(&bullets(&list(job, "required_skills"), NOT_AVAILABLE));
    out.push_str("\n\n#### Preferred Skills\n");
    out.push_str(&bullets(&list(job, "preferred_skills"), NOT_AVAILABLE));
    out.push_str("\n\n### Key Responsibilities\n");
    out.push_str(&numbered(&list(job, "key_responsibilities"), NOT_AVAILABLE));
    out.push_str("\n\n### Company Culture\n");
    out.push_str(&text_or(job, "company_culture", NOT_AVAILABLE));
    out.push_str("\n\n### Benefits\n");
    out.push_str(&bullets(&list(job, "benefits"), NOT_AVAILABLE));
    out.push_str("\n\n---\n\n");

    out.push_str("## Resume Match Analysis\n\n### Match Scores\n");
    for (label, key) in SCORE_ROWS {
        out.push_str(&format!("- {}\n", score_line(label, scores.and_then(|s| s.get(*key)))));
    }
    let gaps = list(resume, "skill_gaps");
    out.push_str("\n### Skill Gaps Identified\n");
    out.push_str(&numbered_bold(&gaps, NO_GAPS));
    out.push_str("\n\n---\n\n");

    out.push_str("## Optimization Recommendations\n\n### Keywords to Add\n");
    out.push_str(&bullets(&gaps, NOT_AVAILABLE));
    out.push_str("\n\n### Experience Descriptions to Improve\n");
    out.push_str(&numbered(&list(resume, "optimization_suggestions"), NOT_AVAILABLE));
    out.push_str("\n\n### ATS Optimization\n");
    out.push_str(&bullets(&list(resume, "ats_optimization"), NOT_AVAILABLE));
    out.push_str("\n\n---\n\n");

    out.push_str("## Action Items (Prioritized)\n\n");
    out.push_str(&numbered(&list(resume, "action_items"), NO_ACTIONS));
    out.push_str("\n\n---\n\n");

    out.push_str(&format!("## Company Research: {}\n\n", header.company_name));
    out.push_str("### Overview\n");
    out.push_str(&text_or(company, "company_overview", NOT_AVAILABLE));
    out.push_str("\n\n### Culture and Values\n");
    out.push_str(&bullets(&list(company, "culture_values"), NOT_AVAILABLE));
    out.push_str("\n\n### Recent News\n");
    out.push_str(&bullets(&list(company, "recent_news"), NOT_AVAILABLE));
    out.push_str("\n\n### Interview Tips\n");
    out.push_str(&numbered(&list(company, "interview_tips"), NOT_AVAILABLE));
    out.push_str("\n\n### Common Interview Questions\n");
    out.push_str(&numbered(&list(company, "common_questions"), NOT_AVAILABLE));
    out.push_str("\n\n### Challenges and Opportunities\n");
    out.push_str(&bullets(&list(company, "challenges_opportunities"), NOT_AVAILABLE));
    out.push_str("\n\n### Industry Position\n");
    out.push_str(&text_or(company, "industry_position", NOT_AVAILABLE));
    out.push_str("\n\n### Career Growth\n");
    out.push_str(&text_or(company, "career_growth", NOT_AVAILABLE));
    out.push_str("\n\n---\n\n");

    if let Some(unclassified) = report.section(UNCLASSIFIED_SECTION) {
        out.push_str("## Additional Analysis\n\n");
        for (role, record) in unclassified {
            let pretty = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
            out.push_str(&format!("### {role}\n\n```json\n{pretty}\n```\n\n"));
        }
        out.push_str("---\n\n");
    }

    out.push_str(&next_steps(&header.company_name));
    out.push_str(
        "\n---\n\n*This analysis was generated using AI-powered resume optimization tools. \
         The recommendations are based on the job requirements and industry best practices \
         for ATS optimization and interview preparation.*\n",
    );

    out
}

fn next_steps(company: &str) -> String {
    format!(
        "## Next Steps\n\n\
         1. **Immediate (1-2 weeks):**\n   \
         - Revise resume with identified keywords and improvements\n   \
         - Update experience descriptions with quantifiable achievements\n\n\
         2. **Short-term (2-4 weeks):**\n   \
         - Research {company} products and services\n   \
         - Practice interview questions using the STAR method\n   \
         - Network with {company} professionals\n\n\
         3. **Long-term (1-3 months):**\n   \
         - Pursue certifications relevant to the role\n   \
         - Close the skill gaps identified above\n"
    )
}

fn score_line(label: &str, score: Option<&Value>) -> String {
    let status = score.map_or(NO_SCORE, status_label);
    format!("{label}: {} — {status}", format_score(score))
}

fn format_score(score: Option<&Value>) -> String {
    match score {
        Some(Value::Number(n)) => format!("{n}/100"),
        _ => NO_SCORE.to_string(),
    }
}

/// Scalar as text; strings verbatim, everything else as compact JSON.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn text_or(record: Option<&Record>, key: &str, placeholder: &str) -> String {
    record
        .and_then(|r| r.get(key))
        .and_then(display_value)
        .unwrap_or_else(|| placeholder.to_string())
}

/// Array items as text. A lone string counts as a one-item list.
fn list(record: Option<&Record>, key: &str) -> Vec<String> {
    match record.and_then(|r| r.get(key)) {
        Some(Value::Array(items)) => items.iter().filter_map(display_value).collect(),
        Some(other) => display_value(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn bullets(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        return format!("- {placeholder}");
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        return placeholder.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(n, i)| format!("{}. {i}", n + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered_bold(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        return placeholder.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(n, i)| format!("{}. **{i}**", n + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
