//! Chat-completion backends.
//!
//! [`create_chat_model`] returns a [`GeminiChat`] when a key is available and
//! a [`DisabledChat`] otherwise. The responder turns any error from either
//! into the apology reply, so a missing key never stops the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use pobo_core::chat::ChatModel;
use pobo_core::{RagError, Result};

use crate::config::{ApiKey, ChatConfig};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn create_chat_model(
    config: &ChatConfig,
    api_key: Option<ApiKey>,
) -> anyhow::Result<Arc<dyn ChatModel>> {
    let model: Arc<dyn ChatModel> = match (config.provider.as_str(), api_key) {
        ("disabled", _) | (_, None) => Arc::new(DisabledChat {
            model: config.model.clone(),
        }),
        ("gemini", Some(key)) => Arc::new(GeminiChat::new(config, key)?),
        (other, Some(_)) => anyhow::bail!("Unknown chat provider: {}", other),
    };
    Ok(model)
}

/// Chat model used when no credential is configured.
pub struct DisabledChat {
    model: String,
}

#[async_trait]
impl ChatModel for DisabledChat {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn is_configured(&self) -> bool {
        false
    }
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(RagError::NotConfigured("chat service"))
    }
}

/// Gemini `generateContent` client.
pub struct GeminiChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: ApiKey,
    timeout_secs: u64,
}

impl GeminiChat {
    pub fn new(config: &ChatConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config
                .url
                .as_deref()
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }
}

/// Concatenated text parts of the first candidate.
fn parse_completion(json: &Value) -> Option<String> {
    let parts = json
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RagError::Timeout {
                        operation: "chat completion",
                        millis: self.timeout_secs * 1000,
                    }
                } else {
                    RagError::ChatService(format!("Gemini request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::ChatService(format!(
                "Gemini API error {}: {}",
                status,
                body.trim().chars().take(300).collect::<String>()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| RagError::ChatService(format!("Gemini returned invalid JSON: {}", e)))?;
        parse_completion(&json)
            .ok_or_else(|| RagError::ChatService("Gemini returned no text".to_string()))
    }
}
