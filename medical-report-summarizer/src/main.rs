use medical_report_summarizer::{
    Config, DEFAULT_REPORT_PATH, OpenAiClient, ReportError, SummaryGenerator, run_report,
};
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the report on stdout stays readable.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Using model {} at {}", config.model, config.base_url);

    let pdf_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));

    let generator = SummaryGenerator::new(OpenAiClient::new(&config), config.model.clone());
    let mut out = std::io::stdout();

    match run_report(&pdf_path, &generator, &mut out).await {
        Ok(_) => info!("Report processed: {}", pdf_path.display()),
        // Already printed for the user.
        Err(ReportError::FileNotFound(_)) | Err(ReportError::PdfRead(_)) => {}
        Err(e) => {
            error!("Report processing failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
