use crate::error::{ReportError, Result};
use crate::llm::CompletionClient;
use crate::models::{LabValues, ReportText};
use crate::tasks::{SummaryGenerator, extract_lab_values, extract_text_from_pdf};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_REPORT_PATH: &str = "sample_report.pdf";
pub const PREVIEW_CHARS: usize = 1000;

/// Everything produced for one report. The summary keeps its own result so
/// a failed summary does not discard the extracted text and lab values.
#[derive(Debug)]
pub struct ReportOutcome {
    pub text: ReportText,
    pub lab_values: LabValues,
    pub summary: Result<String>,
}

/// Runs the report flow and prints each stage to `out`:
/// PDF text → preview → lab values → summary.
///
/// A missing file or unreadable PDF is printed and returned as an error
/// before any later stage runs.
pub async fn run_report<C, W>(
    pdf_path: &Path,
    generator: &SummaryGenerator<C>,
    out: &mut W,
) -> Result<ReportOutcome>
where
    C: CompletionClient,
    W: Write,
{
    if !tokio::fs::try_exists(pdf_path).await.unwrap_or(false) {
        let err = ReportError::FileNotFound(pdf_path.to_path_buf());
        warn!("{}", err);
        writeln!(out, "{}", err)?;
        return Err(err);
    }

    writeln!(out, "Extracting text from PDF...")?;
    let text = match extract_in_background(pdf_path.to_path_buf()).await {
        Ok(text) => text,
        Err(err) => {
            warn!("{}", err);
            writeln!(out, "{}", err)?;
            return Err(err);
        }
    };

    writeln!(out, "Extracted Text:")?;
    writeln!(out, "{} ...", preview(&text, PREVIEW_CHARS))?;

    let lab_values = extract_lab_values(&text);
    info!("Extracted {} lab value(s)", lab_values.len());
    let lab_json = serde_json::to_string(&lab_values).map_err(std::io::Error::other)?;
    writeln!(out)?;
    writeln!(out, "Extracted Lab Values: {}", lab_json)?;

    writeln!(out)?;
    writeln!(out, "Generating Summary...")?;
    let summary = generator.summarize(&text).await;
    writeln!(out)?;
    match &summary {
        Ok(summary) => {
            writeln!(out, "Summary:")?;
            writeln!(out, "{}", summary)?;
        }
        Err(err) => writeln!(out, "{}", err)?,
    }

    Ok(ReportOutcome {
        text,
        lab_values,
        summary,
    })
}

/// PDF parsing is blocking work, so it runs off the async worker threads.
async fn extract_in_background(pdf_path: PathBuf) -> Result<ReportText> {
    tokio::task::spawn_blocking(move || extract_text_from_pdf(&pdf_path))
        .await
        .map_err(|e| ReportError::PdfRead(format!("extraction task failed: {}", e)))?
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
