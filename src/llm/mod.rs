//! Model-invocation collaborator.
//!
//! The engine only ever sees the `ModelClient` trait, so tests swap in a
//! scripted fake and the HTTP backend can change without touching the loop.

use async_trait::async_trait;
use tracing::debug;

use crate::core::config::LlmConfig;
use crate::core::error::SiftError;

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt, get the model's text back. Failures surface as an
    /// opaque `SiftError::Model`.
    async fn invoke(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String, SiftError>;
}

/// OpenAI-compatible `/chat/completions` client.
///
/// Works against api.openai.com, Groq, and key-less local endpoints
/// (Ollama / LM Studio) — an explicitly empty API key skips the
/// Authorization header.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn from_config(http: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            http,
            base_url: config.resolve_base_url(),
            api_key: config.resolve_api_key(),
            model: config.resolve_model(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn invoke(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String, SiftError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SiftError::Model(
                "no API key configured — set llm.api_key in pagesift.json or OPENAI_API_KEY"
                    .to_string(),
            )
        })?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("invoking {} ({} prompt chars)", self.model, prompt.len());

        let body = serde_json::json!({
            "model": self.model,
            "temperature": temperature,
            "max_tokens": max_output_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let builder = self.http.post(url).json(&body);
        // Only send Authorization when a key is provided; key-less local
        // endpoints work without it.
        let builder = if api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(api_key.trim())
        };

        let response = builder
            .send()
            .await
            .map_err(|e| SiftError::Model(format!("chat.completions request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SiftError::Model(format!(
                "chat.completions failed: status={} body={}",
                status, text
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SiftError::Model(format!("chat.completions response parse failed: {}", e)))?;

        value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| SiftError::Model("chat.completions response missing content".to_string()))
    }
}
