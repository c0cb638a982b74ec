//! Embedding provider implementations.
//!
//! Concrete [`EmbeddingProvider`] backends reached over HTTP:
//! - **[`DisabledProvider`]**: no credential or `provider = "disabled"`; every
//!   call fails with `NotConfigured`.
//! - **[`GeminiProvider`]**: Google Generative Language `embedContent`.
//! - **[`OpenAIProvider`]**: any OpenAI-compatible `/embeddings` endpoint.
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to instantiate the backend named in config:
//!
//! ```rust,no_run
//! # use pobo::config::Config;
//! # use pobo::embedding::create_provider;
//! let config = Config::default();
//! let provider = create_provider(&config.embedding, None).unwrap();
//! assert!(!provider.is_configured());
//! ```
//!
//! # Failure policy
//!
//! One attempt per call, bounded by `embedding.timeout_secs`:
//! - 2xx with a non-empty vector → `Embedding::Embedded`
//! - 401/403 with `degrade_on_auth_failure` → `Embedding::Degraded` (zero vector)
//! - any other non-2xx, a network error, or a malformed body → `EmbeddingService`
//! - client-side timeout → `Timeout`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use pobo_core::embedding::{zero_vector, Embedding, EmbeddingProvider};
use pobo_core::{RagError, Result};

use crate::config::{ApiKey, EmbeddingConfig};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Create the [`EmbeddingProvider`] named by `config.provider`.
///
/// A missing API key yields a [`DisabledProvider`] rather than an error, so
/// the app still starts and the responder falls back to static knowledge.
///
/// # Errors
///
/// Returns an error for unknown provider names or if the HTTP client
/// cannot be built.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<ApiKey>,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match (config.provider.as_str(), api_key) {
        ("disabled", _) | (_, None) => Arc::new(DisabledProvider::new(config)),
        ("gemini", Some(key)) => Arc::new(GeminiProvider::new(config, key)?),
        ("openai", Some(key)) => Arc::new(OpenAIProvider::new(config, key)?),
        (other, Some(_)) => anyhow::bail!("Unknown embedding provider: {}", other),
    };
    Ok(provider)
}

fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

// ============ Disabled Provider ============

/// Provider used when embeddings are disabled or no credential is set.
pub struct DisabledProvider {
    model: String,
    dims: usize,
}

impl DisabledProvider {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            model: config.model.clone(),
            dims: config.dims,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }
    fn is_configured(&self) -> bool {
        false
    }
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Err(RagError::NotConfigured("embedding service"))
    }
}

// ============ Shared HTTP handling ============

/// Send one embedding request and turn the response into an [`Embedding`].
async fn send_embedding_request(
    service: &'static str,
    request: reqwest::RequestBuilder,
    dims: usize,
    degrade_on_auth_failure: bool,
    timeout_secs: u64,
    parse: fn(&Value) -> Option<Vec<f32>>,
) -> Result<Embedding> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            RagError::Timeout {
                operation: "embedding",
                millis: timeout_secs * 1000,
            }
        } else {
            RagError::EmbeddingService(format!("{} request failed: {}", service, e))
        }
    })?;

    let status = response.status();
    if status.is_success() {
        let json: Value = response.json().await.map_err(|e| {
            RagError::EmbeddingService(format!("{} returned invalid JSON: {}", service, e))
        })?;
        let values = parse(&json).ok_or_else(|| {
            RagError::EmbeddingService(format!("{} response is missing the embedding", service))
        })?;
        if values.is_empty() {
            return Err(RagError::EmbeddingService(format!(
                "{} returned an empty embedding",
                service
            )));
        }
        return Ok(Embedding::Embedded(values));
    }

    if degrade_on_auth_failure
        && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
    {
        tracing::warn!(
            service,
            status = status.as_u16(),
            dims,
            "embedding credential rejected, returning degraded zero vector"
        );
        return Ok(Embedding::Degraded(zero_vector(dims)));
    }

    let body_text = response.text().await.unwrap_or_default();
    Err(RagError::EmbeddingService(format!(
        "{} API error {}: {}",
        service,
        status,
        excerpt(&body_text)
    )))
}

/// First 300 chars of an error body.
fn excerpt(body: &str) -> &str {
    pobo_core::embedding::truncate_for_embedding(body.trim(), 300)
}

fn f32_array(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

fn require_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(RagError::InvalidInput(
            "text to embed must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ============ Gemini Provider ============

/// Embedding provider using Google's Generative Language API.
///
/// Calls `POST {base}/models/{model}:embedContent` with the key in the
/// `x-goog-api-key` header.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dims: usize,
    api_key: ApiKey,
    timeout_secs: u64,
    degrade_on_auth_failure: bool,
}

impl GeminiProvider {
    pub fn new(config: &EmbeddingConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            dims: config.dims,
            api_key,
            timeout_secs: config.timeout_secs,
            degrade_on_auth_failure: config.degrade_on_auth_failure,
        })
    }
}

/// Extract `embedding.values` from an `embedContent` response.
fn parse_gemini_response(json: &Value) -> Option<Vec<f32>> {
    f32_array(json.get("embedding")?.get("values")?)
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        require_text(text)?;
        let body = serde_json::json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": self.dims,
        });
        let request = self
            .client
            .post(format!("{}/models/{}:embedContent", self.base_url, self.model))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body);

        send_embedding_request(
            "Gemini embedding",
            request,
            self.dims,
            self.degrade_on_auth_failure,
            self.timeout_secs,
            parse_gemini_response,
        )
        .await
    }
}

// ============ OpenAI Provider ============

/// Embedding provider for OpenAI-compatible APIs.
///
/// Calls `POST {base}/embeddings` with a bearer token. `embedding.url`
/// points it at any compatible server (LiteLLM, vLLM, Ollama's `/v1`).
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dims: usize,
    api_key: ApiKey,
    timeout_secs: u64,
    degrade_on_auth_failure: bool,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            dims: config.dims,
            api_key,
            timeout_secs: config.timeout_secs,
            degrade_on_auth_failure: config.degrade_on_auth_failure,
        })
    }
}

/// Extract `data[0].embedding` from an OpenAI embeddings response.
fn parse_openai_response(json: &Value) -> Option<Vec<f32>> {
    f32_array(json.get("data")?.as_array()?.first()?.get("embedding")?)
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        require_text(text)?;
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });
        let request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&body);

        send_embedding_request(
            "OpenAI embedding",
            request,
            self.dims,
            self.degrade_on_auth_failure,
            self.timeout_secs,
            parse_openai_response,
        )
        .await
    }
}
