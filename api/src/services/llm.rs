//! Hosted LLM clients: Claude Messages API and OpenAI Chat/Embeddings
//!
//! One request per call. There is no retry: callers substitute fallback
//! content when a call fails.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{LlmConfig, LlmProviderKind, ProviderSettings};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),
}

/// A single-turn completion
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

async fn error_for_status(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

// ============================================================================
// Claude
// ============================================================================

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl ClaudeClient {
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = ClaudeRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: request.system,
            temperature: request.temperature,
            messages: [ChatMessage {
                role: "user",
                content: request.prompt,
            }],
        };

        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let parsed: ClaudeResponse = error_for_status("Claude", resp).await?.json().await?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse("Claude"));
        }
        Ok(text)
    }
}

// ============================================================================
// OpenAI
// ============================================================================

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    http: Client,
}

impl OpenAiClient {
    pub fn new(
        settings: &ProviderSettings,
        embedding_model: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            embedding_model: embedding_model.to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = OpenAiChatRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: OpenAiChatResponse = error_for_status("OpenAI", resp).await?.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyResponse("OpenAI"))
    }

    /// Embedding vector of `input`
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let resp = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.embedding_model,
                input,
            })
            .send()
            .await?;

        let parsed: EmbeddingResponse = error_for_status("OpenAI", resp).await?.json().await?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or(LlmError::EmptyResponse("OpenAI"))
    }
}

// ============================================================================
// Provider dispatch
// ============================================================================

/// The text-generation provider selected in configuration
#[derive(Clone)]
pub enum LlmClient {
    Claude(ClaudeClient),
    OpenAi(OpenAiClient),
}

impl LlmClient {
    /// Generation client for the configured provider, if its key is set
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(match config.provider {
            LlmProviderKind::Claude => match &config.anthropic {
                Some(settings) => Some(LlmClient::Claude(ClaudeClient::new(settings, timeout)?)),
                None => None,
            },
            LlmProviderKind::OpenAi => match &config.openai {
                Some(settings) => Some(LlmClient::OpenAi(OpenAiClient::new(
                    settings,
                    &config.embedding_model,
                    timeout,
                )?)),
                None => None,
            },
        })
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            LlmClient::Claude(_) => "claude",
            LlmClient::OpenAi(_) => "openai",
        }
    }

    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        match self {
            LlmClient::Claude(c) => c.complete(request).await,
            LlmClient::OpenAi(c) => c.complete(request).await,
        }
    }
}

/// Embedding client, available whenever an OpenAI key is configured
pub fn embedder_from_config(config: &LlmConfig) -> Result<Option<OpenAiClient>, LlmError> {
    config
        .openai
        .as_ref()
        .map(|settings| {
            OpenAiClient::new(
                settings,
                &config.embedding_model,
                Duration::from_secs(config.timeout_secs),
            )
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> ProviderSettings {
        ProviderSettings {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            base_url: format!("{}/v1/", server.uri()),
        }
    }

    fn request() -> CompletionRequest<'static> {
        CompletionRequest {
            system: "You are a TikTok strategist.",
            prompt: "Give me ideas",
            max_tokens: 256,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_claude_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "test-model",
                "system": "You are a TikTok strategist.",
                "messages": [{ "role": "user", "content": "Give me ideas" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "[{\"title\":" },
                    { "type": "tool_use", "id": "x" },
                    { "type": "text", "text": "\"A\"}]" }
                ],
                "model": "test-model",
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(&settings(&server), Duration::from_secs(5)).unwrap();
        let text = client.complete(&request()).await.unwrap();
        assert_eq!(text, "[{\"title\":\"A\"}]");
    }

    #[tokio::test]
    async fn test_claude_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate_limited"))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(&settings(&server), Duration::from_secs(5)).unwrap();
        match client.complete(&request()).await {
            Err(LlmError::Api { status, body, .. }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate_limited");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_openai_complete_and_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(json!({ "model": "embed-small" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [0.25, -0.5, 1.0] }]
            })))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&settings(&server), "embed-small", Duration::from_secs(5)).unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "hello");
        assert_eq!(client.embed("hook").await.unwrap(), vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_openai_empty_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&settings(&server), "embed-small", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.complete(&request()).await,
            Err(LlmError::EmptyResponse("OpenAI"))
        ));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = LlmConfig {
            provider: LlmProviderKind::Claude,
            anthropic: None,
            openai: Some(ProviderSettings {
                api_key: "k".to_string(),
                model: "m".to_string(),
                base_url: "http://localhost".to_string(),
            }),
            embedding_model: "e".to_string(),
            timeout_secs: 1,
        };
        assert!(LlmClient::from_config(&config).unwrap().is_none());
        assert!(embedder_from_config(&config).unwrap().is_some());
    }
}
