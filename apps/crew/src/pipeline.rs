//! End-to-end wiring used by the CLI:
//! extract → build plan → orchestrate → reconcile → render.
//!
//! Persistence is left to the caller so a write failure never hides the run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::crew::tasks::standard_plan;
use crate::errors::AppError;
use crate::extract::{extract_resume_text, ContentExtractor, ExtractedText, ExtractionError};
use crate::llm_client::Generator;
use crate::orchestrator::{ExecutionMode, Orchestrator, RunResult};
use crate::reconcile::{reconcile, Reconciliation};
use crate::render::{render_markdown, ReportHeader};

/// Everything a run needs besides the generator.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub job_url: String,
    pub resume_path: PathBuf,
    pub include_company_research: bool,
    pub mode: ExecutionMode,
    pub run_timeout: Option<Duration>,
    pub header: ReportHeader,
}

impl RunSettings {
    pub fn from_config(config: &Config, analysis_date: chrono::NaiveDate) -> Self {
        Self {
            job_url: config.job_url.clone(),
            resume_path: config.resume_path.clone(),
            include_company_research: config.enable_company_research,
            mode: ExecutionMode::from_max_parallel(config.max_parallel),
            run_timeout: Some(config.run_timeout),
            header: ReportHeader {
                candidate_name: config.candidate_name.clone(),
                company_name: config.company_name.clone(),
                position_title: config.position_title.clone(),
                analysis_date,
            },
        }
    }
}

#[derive(Debug)]
pub struct Inputs {
    pub job: ExtractedText,
    pub resume: ExtractedText,
}

#[derive(Debug)]
pub struct Outcome {
    pub run: RunResult,
    pub reconciliation: Reconciliation,
    pub markdown: String,
}

/// Resume first: a missing resume must abort before any network traffic.
pub async fn load_inputs(
    extractor: &ContentExtractor,
    settings: &RunSettings,
) -> Result<Inputs, ExtractionError> {
    let resume = extract_resume_text(&settings.resume_path).await?;
    let job = extractor.fetch_job_posting(&settings.job_url).await?;
    Ok(Inputs { job, resume })
}

pub async fn analyze(
    generator: Arc<dyn Generator>,
    inputs: &Inputs,
    settings: &RunSettings,
) -> Result<Outcome, AppError> {
    let plan = standard_plan(
        &inputs.job,
        &inputs.resume,
        &settings.header.company_name,
        settings.include_company_research,
    )?;

    let mut orchestrator = Orchestrator::new(generator).with_mode(settings.mode);
    if let Some(timeout) = settings.run_timeout {
        orchestrator = orchestrator.with_run_timeout(timeout);
    }
    let run = orchestrator.run(&plan).await;

    let reconciliation = reconcile(&run);
    if reconciliation.report.is_empty() {
        warn!("No task produced a usable section; the report will only hold placeholders");
    }
    info!(
        "Reconciled {} sections ({} warnings)",
        reconciliation.report.sections().len(),
        reconciliation.warnings.len()
    );

    let markdown = render_markdown(&reconciliation.report, &settings.header);
    Ok(Outcome {
        run,
        reconciliation,
        markdown,
    })
}

pub async fn run(
    extractor: &ContentExtractor,
    generator: Arc<dyn Generator>,
    settings: &RunSettings,
) -> Result<Outcome, AppError> {
    let inputs = load_inputs(extractor, settings).await?;
    analyze(generator, &inputs, settings).await
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::crew::agents::{AgentDescriptor, AgentKind};
    use crate::llm_client::mock::ScriptedGenerator;
    use crate::reconcile::{JOB_ANALYSIS_SECTION, RESUME_OPTIMIZATION_SECTION};

    async fn serve_posting(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/jobs/director")
    }

    fn settings(job_url: String, resume_path: PathBuf) -> RunSettings {
        RunSettings {
            job_url,
            resume_path,
            include_company_research: false,
            mode: ExecutionMode::Sequential,
            run_timeout: None,
            header: ReportHeader {
                candidate_name: "Jane Doe".to_string(),
                company_name: "Google Cloud".to_string(),
                position_title: "Director".to_string(),
                analysis_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            },
        }
    }

    fn role(kind: AgentKind) -> String {
        AgentDescriptor::for_kind(kind).unwrap().role().to_string()
    }

    #[tokio::test]
    async fn test_two_task_chain_end_to_end() {
        let url = serve_posting("<html><body><h1>Director, Customer Engineering</h1></body></html>").await;
        let dir = tempfile::tempdir().unwrap();
        let resume_path = dir.path().join("resume.txt");
        std::fs::write(&resume_path, "Jane Doe\n15 years of cloud sales leadership").unwrap();

        let generator = Arc::new(ScriptedGenerator::new());
        generator
            .reply(
                &role(AgentKind::JobAnalyzer),
                "```json\n{\"job_title\": \"Director\"}\n```",
            )
            .reply(
                &role(AgentKind::ResumeAnalyzer),
                "{\"match_scores\": {\"overall_fit\": 85}}",
            );

        let extractor = ContentExtractor::new().unwrap();
        let outcome = run(&extractor, generator.clone(), &settings(url, resume_path))
            .await
            .unwrap();

        assert_eq!(outcome.run.len(), 2);
        assert_eq!(outcome.run.failed_count(), 0);
        assert!(outcome.reconciliation.warnings.is_empty());
        assert!(outcome.reconciliation.report.section(JOB_ANALYSIS_SECTION).is_some());
        assert!(outcome
            .reconciliation
            .report
            .section(RESUME_OPTIMIZATION_SECTION)
            .is_some());
        assert!(outcome.markdown.contains("Overall Fit: 85/100 — Excellent"));

        let job_prompt = generator.prompt_for(&role(AgentKind::JobAnalyzer)).unwrap();
        assert!(job_prompt.contains("Director, Customer Engineering"));
        let resume_prompt = generator.prompt_for(&role(AgentKind::ResumeAnalyzer)).unwrap();
        assert!(resume_prompt.contains("15 years of cloud sales leadership"));
        assert!(resume_prompt.contains("{\"job_title\": \"Director\"}"));
    }

    #[tokio::test]
    async fn test_prose_resume_output_degrades_report() {
        let url = serve_posting("<p>Director</p>").await;
        let dir = tempfile::tempdir().unwrap();
        let resume_path = dir.path().join("resume.md");
        std::fs::write(&resume_path, "# Jane Doe").unwrap();

        let generator = Arc::new(ScriptedGenerator::new());
        generator
            .reply(&role(AgentKind::JobAnalyzer), "{\"job_title\": \"Director\"}")
            .reply(&role(AgentKind::ResumeAnalyzer), "The candidate looks like a strong fit.");

        let extractor = ContentExtractor::new().unwrap();
        let outcome = run(&extractor, generator, &settings(url, resume_path))
            .await
            .unwrap();

        assert!(outcome
            .reconciliation
            .report
            .section(RESUME_OPTIMIZATION_SECTION)
            .is_none());
        assert_eq!(outcome.reconciliation.warnings.len(), 1);
        assert!(outcome.markdown.contains("Overall Fit: N/A — N/A"));
        assert!(outcome.markdown.contains("No specific gaps identified"));
    }

    /// In-memory sink for the `fmt` layer.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn inputs() -> Inputs {
        Inputs {
            job: ExtractedText {
                source: "https://example.com/job".to_string(),
                content: "Director".to_string(),
                format: crate::extract::SourceFormat::Html,
            },
            resume: ExtractedText {
                source: "cv.txt".to_string(),
                content: "Jane".to_string(),
                format: crate::extract::SourceFormat::Text,
            },
        }
    }

    #[tokio::test]
    async fn test_each_reconciliation_warning_is_logged_once() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let generator = Arc::new(ScriptedGenerator::new());
        generator
            .reply(&role(AgentKind::JobAnalyzer), "{\"job_title\": \"Director\"}")
            .reply(&role(AgentKind::ResumeAnalyzer), "Looks like a strong fit.");

        let outcome = analyze(generator, &inputs(), &settings(String::new(), PathBuf::new()))
            .await
            .unwrap();

        assert_eq!(outcome.reconciliation.warnings.len(), 1);
        let warning = outcome.reconciliation.warnings[0].to_string();
        assert_eq!(logs.text().matches(warning.as_str()).count(), 1, "{}", logs.text());
    }

    #[tokio::test]
    async fn test_missing_resume_aborts_before_any_call() {
        // Nothing listens here; reaching the fetch would surface as Network.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(ScriptedGenerator::new());
        let extractor = ContentExtractor::new().unwrap();

        let err = run(
            &extractor,
            generator.clone(),
            &settings(format!("http://{addr}/"), dir.path().join("nonexistent.pdf")),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::FileNotFound { .. })
        ));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_company_research_adds_third_task() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.reply(
            &role(AgentKind::CompanyResearcher),
            "{\"company_overview\": \"Cloud division\"}",
        );

        let mut settings = settings(String::new(), PathBuf::new());
        settings.include_company_research = true;
        settings.mode = ExecutionMode::Parallel { max_concurrent: 2 };

        let outcome = analyze(generator.clone(), &inputs(), &settings).await.unwrap();

        assert_eq!(outcome.run.len(), 3);
        // Unscripted roles fail; their tasks still occupy their slots.
        assert_eq!(outcome.run.failed_count(), 2);
        assert_eq!(generator.call_count(), 3);
        assert!(outcome.markdown.contains("### Overview\nCloud division"));
    }
}
