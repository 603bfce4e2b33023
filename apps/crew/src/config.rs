use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_JOB_URL: &str = "https://jobs.weekday.works/google-director%2C-customer-engineering%2C-india%2C-google-cloud";
const DEFAULT_COMPANY_NAME: &str = "Google Cloud";
const DEFAULT_CANDIDATE_NAME: &str = "Abhishek Sharma";
const DEFAULT_POSITION_TITLE: &str = "Director, Customer Engineering, Google Cloud";
const DEFAULT_RESUME_PATH: &str = "knowledge/Abhishek_Sharma_Resume.pdf";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 600;

/// Runtime configuration loaded from environment variables.
///
/// The CLI takes no flags: every field has a hardcoded default and the
/// environment (or a `.env` file) only overrides it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Empty when unset. A missing key surfaces as a per-task generation
    /// failure, not as a startup error.
    pub anthropic_api_key: String,
    pub job_url: String,
    pub company_name: String,
    pub candidate_name: String,
    pub position_title: String,
    pub resume_path: PathBuf,
    pub output_dir: PathBuf,
    /// 1 = strictly sequential execution.
    pub max_parallel: usize,
    pub run_timeout: Duration,
    pub enable_company_research: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_parallel = optional_env("CREW_MAX_PARALLEL")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("CREW_MAX_PARALLEL must be a positive integer")?
            .unwrap_or(1)
            .max(1);

        let run_timeout_secs = optional_env("CREW_RUN_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("CREW_RUN_TIMEOUT_SECS must be a number of seconds")?
            .unwrap_or(DEFAULT_RUN_TIMEOUT_SECS);

        let enable_company_research = optional_env("CREW_ENABLE_COMPANY_RESEARCH")
            .map(|v| parse_flag(&v))
            .transpose()?
            .unwrap_or(false);

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY").unwrap_or_default(),
            job_url: env_or("CREW_JOB_URL", DEFAULT_JOB_URL),
            company_name: env_or("CREW_COMPANY_NAME", DEFAULT_COMPANY_NAME),
            candidate_name: env_or("CREW_CANDIDATE_NAME", DEFAULT_CANDIDATE_NAME),
            position_title: env_or("CREW_POSITION_TITLE", DEFAULT_POSITION_TITLE),
            resume_path: PathBuf::from(env_or("CREW_RESUME_PATH", DEFAULT_RESUME_PATH)),
            output_dir: PathBuf::from(env_or("CREW_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            max_parallel,
            run_timeout: Duration::from_secs(run_timeout_secs),
            enable_company_research,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("Invalid boolean flag value '{other}'"),
    }
}
