mod config;
mod crew;
mod errors;
mod extract;
mod llm_client;
mod orchestrator;
mod output;
mod pipeline;
mod reconcile;
mod render;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::AppError;
use crate::extract::ContentExtractor;
use crate::llm_client::LlmClient;
use crate::pipeline::RunSettings;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting crew v{}", env!("CARGO_PKG_VERSION"));

    println!("Starting resume analysis");
    println!("  Resume:  {}", config.resume_path.display());
    println!("  Company: {}", config.company_name);
    println!("  Job URL: {}", config.job_url);

    let extractor = ContentExtractor::new()?;
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let settings = RunSettings::from_config(&config, chrono::Local::now().date_naive());

    let outcome = match pipeline::run(&extractor, Arc::new(llm), &settings).await {
        Ok(outcome) => outcome,
        Err(e @ AppError::Extraction(_)) => {
            for line in failure_lines(&e) {
                println!("{line}");
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = output::write_artifacts(
        &config.output_dir,
        &outcome.run,
        &outcome.reconciliation,
        &outcome.markdown,
    )
    .await
    {
        error!("{}", AppError::from(e));
        println!("Analysis finished, but the results could not be saved.");
        return Ok(());
    }

    println!(
        "Analysis complete: {}/{} tasks succeeded",
        outcome.run.len() - outcome.run.failed_count(),
        outcome.run.len()
    );
    println!("Results saved to {}/", config.output_dir.display());

    Ok(())
}

/// What the user sees when inputs cannot be loaded: the error, then a hint.
fn failure_lines(err: &AppError) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    if let Some(hint) = err.hint() {
        lines.push(hint.to_string());
    }
    lines
}
