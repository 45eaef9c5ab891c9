use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::ChatCompletion;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("No content in response")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: "google/gemini-2.5-pro".into(),
            max_tokens: 1500,
            temperature: 0.3,
        }
    }
}

/// Chat-completion client for the OpenRouter API.
///
/// The request timeout is a property of the `reqwest::Client` passed in.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    params: ChatParams,
}

impl OpenRouterClient {
    pub fn new(client: Client, api_key: impl Into<String>, params: ChatParams) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".into(),
            params,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn params(&self) -> &ChatParams {
        &self.params
    }

    pub async fn send_completion_request(
        &self,
        user_content: &str,
    ) -> Result<CompletionResponse, ChatError> {
        let body = CompletionRequest {
            model: &self.params.model,
            messages: vec![CompletionRequestMessage {
                role: "user",
                content: user_content,
            }],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionRequestMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

impl ChatCompletion for OpenRouterClient {
    type Error = ChatError;

    #[tracing::instrument(skip_all, fields(model = %self.params.model))]
    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        let response = self
            .send_completion_request(prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        response.into_text().ok_or(ChatError::EmptyResponse)
    }
}
