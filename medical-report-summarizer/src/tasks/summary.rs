use crate::error::{ReportError, Result};
use crate::llm::CompletionClient;
use crate::models::{ChatCompletionRequest, ChatMessage};
use tracing::{error, info};

pub const SYSTEM_PROMPT: &str = "You are a helpful medical assistant.";
pub const SUMMARY_INSTRUCTION: &str =
    "Summarize the following medical report in simple terms for a non-medical person:\n\n";
pub const SUMMARY_MAX_TOKENS: u32 = 800;

/// Turns report text into a plain-language summary via a completion service.
pub struct SummaryGenerator<C> {
    client: C,
    model: String,
}

impl<C: CompletionClient> SummaryGenerator<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub fn build_request(&self, report_text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("{}{}", SUMMARY_INSTRUCTION, report_text)),
            ],
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }

    pub async fn summarize(&self, report_text: &str) -> Result<String> {
        info!(
            "Generating summary for report ({} characters)",
            report_text.chars().count()
        );

        let request = self.build_request(report_text);
        let response = self.client.complete(&request).await.map_err(|e| {
            error!("Summary request failed: {}", e);
            ReportError::RemoteService(e.to_string())
        })?;

        let content = response.first_content().ok_or_else(|| {
            ReportError::RemoteService("response contained no message content".to_string())
        })?;

        let summary = content.trim().to_string();
        info!("Generated summary ({} characters)", summary.chars().count());
        Ok(summary)
    }
}
