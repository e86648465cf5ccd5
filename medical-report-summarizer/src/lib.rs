pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod tasks;
pub mod workflow;

pub use config::Config;
pub use error::{ReportError, Result};
pub use llm::{CompletionClient, OpenAiClient};
pub use models::*;
pub use tasks::{LabValueExtractor, SummaryGenerator, extract_lab_values, extract_text_from_pdf};
pub use workflow::{DEFAULT_REPORT_PATH, ReportOutcome, run_report};
