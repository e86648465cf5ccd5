use crate::config::Config;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

/// A chat-completion backend. Implemented over HTTP by [`OpenAiClient`],
/// and by in-memory fakes in tests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse> {
        info!(
            "Calling chat completion API (model: {}, max_tokens: {})",
            request.model, request.max_tokens
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion API returned {}", status);
            return Err(anyhow!("LLM API request failed: {} {}", status, body.trim()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Invalid response format from LLM: {}", e))?;

        info!(
            "Chat completion API returned {} choice(s)",
            completion.choices.len()
        );
        Ok(completion)
    }
}

/// Returns a canned response and records every request it was given.
#[cfg(test)]
pub(crate) struct FakeClient {
    pub response: Option<ChatCompletionResponse>,
    pub seen: std::sync::Mutex<Vec<ChatCompletionRequest>>,
}

#[cfg(test)]
impl FakeClient {
    pub fn replying(response: ChatCompletionResponse) -> Self {
        Self {
            response: Some(response),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse> {
        self.seen.lock().unwrap().push(request.clone());
        self.response
            .clone()
            .ok_or_else(|| anyhow!("LLM API request failed: 429 Too Many Requests"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn client_for(base_url: String) -> OpenAiClient {
        OpenAiClient::new(&Config {
            api_key: "sk-test".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            base_url,
        })
    }

    fn sample_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![
                ChatMessage::system("You are a helpful medical assistant."),
                ChatMessage::user("Summarize this"),
            ],
            max_tokens: 800,
        }
    }

    async fn completion_handler(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        *captured.body.lock().unwrap() = Some(body);
        *captured.auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "  All results are normal.  "},
                    "finish_reason": "stop"
                }
            ]
        }))
    }

    #[tokio::test]
    async fn sends_request_and_decodes_choices() {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v1/chat/completions", post(completion_handler))
            .with_state(captured.clone());
        let client = client_for(spawn_server(app).await);

        let response = client.complete(&sample_request()).await.unwrap();
        assert_eq!(response.first_content(), Some("  All results are normal.  "));

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Summarize this");

        let auth = captured.auth.lock().unwrap().clone();
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let client = client_for(spawn_server(app).await);

        let err = client.complete(&sample_request()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("401"), "unexpected error: {}", message);
        assert!(message.contains("invalid api key"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "this is not json" }),
        );
        let client = client_for(spawn_server(app).await);

        let err = client.complete(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid response format"));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Bind then drop so the port is closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/v1", addr));
        assert!(client.complete(&sample_request()).await.is_err());
    }
}
