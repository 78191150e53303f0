//! Chat-completion client for model-generated analysis
//!
//! Talks to an OpenAI-compatible endpoint (LM Studio locally). Unlike the
//! exchange client, failures here are surfaced to the caller as distinct
//! error kinds; the UI shows them verbatim. No retries, no fallback model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Generation calls are slow; model discovery should answer quickly
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Cannot reach generation endpoint: {0}")]
    Connection(String),

    #[error("Generation request failed with HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for one generation endpoint and model
pub struct LlmClient {
    client: Client,
    api_url: String,
    model_name: String,
}

impl LlmClient {
    pub fn new(api_url: &str, model_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
        }
    }

    /// Check the endpoint is up and list the loaded model ids
    pub async fn check_connection(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/models", self.api_url);

        let response = self
            .client
            .get(&url)
            .timeout(DISCOVERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| GenerationError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();
        info!("Generation endpoint reachable, models: {:?}", ids);
        Ok(ids)
    }

    /// Generate text for a prompt
    pub async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.api_url);

        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(GENERATION_TIMEOUT)
            .send()
            .await
            .map_err(|e| GenerationError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".to_string()))
    }
}
