//! Content Extractor — turns a job-posting URL and a resume file into plain text.
//!
//! Extraction errors are precondition failures: the pipeline stops before any
//! task is submitted. No caching; every call hits the network or the disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub mod html;

const FETCH_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("crew/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file format '{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Where extracted text came from and how it was decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFormat {
    Html,
    Pdf { pages: usize },
    Text,
}

/// Normalized plain text plus its origin (URL or file path).
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub source: String,
    pub content: String,
    pub format: SourceFormat,
}

#[derive(Clone)]
pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()?,
        })
    }

    /// GETs the posting and strips markup. Transport failures and non-2xx
    /// statuses are both reported as `Network`.
    pub async fn fetch_job_posting(&self, url: &str) -> Result<ExtractedText, ExtractionError> {
        let network = |message: String| ExtractionError::Network {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("server responded with status {status}")));
        }

        let body = response.text().await.map_err(|e| network(e.to_string()))?;
        let content = html::strip_markup(&body);
        info!("Fetched job posting from {url} ({} chars)", content.len());

        Ok(ExtractedText {
            source: url.to_string(),
            content,
            format: SourceFormat::Html,
        })
    }
}

/// Reads a resume as plain text, dispatching on the file extension.
///
/// Existence is checked before the extension, so a missing `.docx` reports
/// `FileNotFound` rather than `UnsupportedFormat`.
pub async fn extract_resume_text(path: &Path) -> Result<ExtractedText, ExtractionError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ExtractionError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => extract_pdf(path).await,
        "txt" | "md" => read_text(path).await,
        _ => Err(ExtractionError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: format!(".{extension}"),
        }),
    }
}

async fn read_text(path: &Path) -> Result<ExtractedText, ExtractionError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ExtractionError::Parse {
            path: path.to_path_buf(),
            message: format!("text read error: {e}"),
        })?;

    debug!("Read text resume {} ({} chars)", path.display(), content.len());

    Ok(ExtractedText {
        source: path.display().to_string(),
        content,
        format: SourceFormat::Text,
    })
}

/// PDF decoding is CPU-bound and the parser may panic on hostile input, so it
/// runs on the blocking pool and a panic is reported as `Parse`.
async fn extract_pdf(path: &Path) -> Result<ExtractedText, ExtractionError> {
    let parse_error = |message: String| ExtractionError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| parse_error(format!("read error: {e}")))?;

    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| parse_error(format!("PDF parser aborted: {e}")))?
    .map_err(|e| parse_error(format!("PDF parsing error: {e}")))?;

    let page_count = pages.len();
    let content = pages.join("\n");
    info!(
        "Extracted {} pages from {} ({} chars)",
        page_count,
        path.display(),
        content.len()
    );

    Ok(ExtractedText {
        source: path.display().to_string(),
        content,
        format: SourceFormat::Pdf { pages: page_count },
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves exactly one canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/jobs/director")
    }

    #[tokio::test]
    async fn test_fetch_job_posting_strips_markup() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            "<html><head><style>p{color:red}</style></head><body><h1>Director</h1><p>Lead &amp; grow</p></body></html>",
        )
        .await;

        let extractor = ContentExtractor::new().unwrap();
        let text = extractor.fetch_job_posting(&url).await.unwrap();

        assert_eq!(text.source, url);
        assert_eq!(text.format, SourceFormat::Html);
        assert!(text.content.contains("Director"));
        assert!(text.content.contains("Lead & grow"));
        assert!(!text.content.contains("color:red"));
        assert!(!text.content.contains('<'));
    }

    #[tokio::test]
    async fn test_fetch_job_posting_non_2xx_is_network_error() {
        let url = serve_once("HTTP/1.1 404 Not Found", "gone").await;

        let extractor = ContentExtractor::new().unwrap();
        let err = extractor.fetch_job_posting(&url).await.unwrap_err();

        match err {
            ExtractionError::Network { message, .. } => assert!(message.contains("404")),
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_job_posting_connection_refused_is_network_error() {
        // Bind then drop to obtain a port with nothing listening on it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let extractor = ContentExtractor::new().unwrap();
        let err = extractor
            .fetch_job_posting(&format!("http://{addr}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Network { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_resume_text(&dir.path().join("nonexistent.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::write(&path, b"not really a docx").unwrap();

        let err = extract_resume_text(&path).await.unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat { extension, .. } => assert_eq!(extension, ".docx"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_text_and_markdown_resumes_are_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cv.txt", "CV.MD"] {
            let path = dir.path().join(name);
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "Jane Doe\nStaff Engineer, 12 years").unwrap();

            let text = extract_resume_text(&path).await.unwrap();
            assert_eq!(text.format, SourceFormat::Text);
            assert!(text.content.starts_with("Jane Doe"));
            assert_eq!(text.source, path.display().to_string());
        }
    }

    /// Smallest well-formed PDF with one Helvetica text line per page.
    fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                (0..pages.len())
                    .map(|i| format!("{} 0 R", 4 + 2 * i))
                    .collect::<Vec<_>>()
                    .join(" "),
                pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref_at = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[tokio::test]
    async fn test_pdf_pages_are_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.PDF");
        std::fs::write(&path, minimal_pdf(&["PageOneAlpha", "PageTwoBeta"])).unwrap();

        let text = extract_resume_text(&path).await.unwrap();

        assert_eq!(text.format, SourceFormat::Pdf { pages: 2 });
        assert_eq!(text.source, path.display().to_string());
        let first = text.content.find("PageOneAlpha").expect("page 1 text");
        let second = text.content.find("PageTwoBeta").expect("page 2 text");
        assert!(first < second, "pages out of order: {:?}", text.content);
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is definitely not a PDF document").unwrap();

        let err = extract_resume_text(&path).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }), "got {err:?}");
    }
}
