use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading PDF: {0}")]
    PdfRead(String),

    #[error("Error generating summary: {0}")]
    RemoteService(String),

    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),

    #[error("Invalid pattern for lab value {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to write report output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
