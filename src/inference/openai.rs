//! OpenAI-compatible implementation of the inference capability.
//!
//! Drives a chat-completions endpoint directly; any service exposing the
//! same API shape (Azure, proxies, local gateways) works via
//! `with_base_url`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::traits::{InferenceCapability, InferenceError};

/// Chat-completions backed inference.
#[derive(Clone)]
pub struct OpenAiInference {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiInference {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, InferenceError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| InferenceError::Fatal("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl InferenceCapability for OpenAiInference {
    async fn run(&self, prompt: &str, input_text: &str) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: input_text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Server-side trouble is worth a retry; client errors are not.
            return if status.is_server_error() || status.as_u16() == 429 {
                Err(InferenceError::Transient(format!("HTTP {status}: {body}")))
            } else {
                Err(InferenceError::Fatal(format!("HTTP {status}: {body}")))
            };
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Transient(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| InferenceError::Fatal("no choices in response".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
