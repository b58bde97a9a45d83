//! LLM provider client.
//!
//! A small async interface over an OpenAI-compatible chat completions API that
//! returns parsed JSON, plus a scripted fake for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use scenario_core::ApiKey;

/// Provider connection settings shared by every AI-backed engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub endpoint: String,
    /// Client-side timeout. `None` waits for the provider indefinitely.
    pub timeout_secs: Option<u64>,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            timeout_secs: None,
            temperature: 0.7,
        }
    }
}

/// Provider transport errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

/// A provider that answers a prompt with a JSON document.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str)
    -> Result<JsonValue, LlmError>;
}

/// OpenAI-compatible HTTP client.
pub struct HttpLlmClient {
    config: ProviderConfig,
    api_key: ApiKey,
    model: String,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: ProviderConfig, api_key: ApiKey, model: impl Into<String>) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key,
            model: model.into(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        match (e.is_timeout(), self.config.timeout_secs) {
            (true, Some(secs)) => LlmError::Timeout(secs),
            _ => LlmError::Http(format!("request failed: {e}")),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<JsonValue, LlmError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::Http(format!(
                "HTTP {} from provider",
                response.status()
            )));
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidJson(format!("failed to parse response: {e}")))?;

        let content = payload
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .ok_or(LlmError::EmptyResponse)?;

        parse_json_content(content)
    }
}

/// Parse model text as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_json_content(content: &str) -> Result<JsonValue, LlmError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim())
        .map_err(|e| LlmError::InvalidJson(format!("model output is not valid JSON: {e}")))
}

/// Scripted client for tests.
///
/// Responses are handed out in order; the last one repeats once the script is
/// down to a single entry.
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<JsonValue, LlmError>>>,
    call_count: Mutex<usize>,
}

impl FakeLlmClient {
    pub fn new(responses: Vec<Result<JsonValue, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
        }
    }

    pub fn always_valid(json: JsonValue) -> Self {
        Self::new(vec![Ok(json)])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete_json(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<JsonValue, LlmError> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Http("fake client lock poisoned".to_string()))?;

        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
