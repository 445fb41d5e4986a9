//! Reasoning-service client interface and providers

use crate::error::{AgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Request to the reasoning service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// System instructions
    pub system: String,

    /// User payload (alert summary + history), already serialized
    pub prompt: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(system: String, prompt: String, model: String) -> Self {
        Self {
            system,
            prompt,
            model,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from the reasoning service. Free-form text, always untrusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
}

/// Async reasoning-service client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat request, returning the raw response text
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Ollama chat provider (`POST {url}` with the messages payload)
pub struct OllamaProvider {
    url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::LlmUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaProvider {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt},
            ],
            "stream": false,
            "options": {"temperature": request.temperature.unwrap_or(0.2)},
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::LlmUnavailable(format!("ollama call failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AgentError::LlmUnavailable(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(AgentError::LlmUnavailable(format!(
                "ollama error ({status}): {text}"
            )));
        }

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AgentError::InvalidResponse(format!("non-JSON chat envelope: {e}")))?;
        let content = value
            .pointer("/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| AgentError::InvalidResponse("no message content".to_string()))?
            .trim()
            .to_string();

        Ok(LlmResponse {
            content,
            model: request.model,
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Mock reasoning provider for tests
pub struct MockProvider {
    response: std::result::Result<String, String>,
}

impl MockProvider {
    /// Always return the given response text
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    /// Simulate an unreachable or timed-out service
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

#[async_trait]
impl LlmClient for MockProvider {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse> {
        match &self.response {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model,
            }),
            Err(message) => Err(AgentError::LlmUnavailable(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
