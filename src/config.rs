//! TOML configuration with environment overlays.
//!
//! Settings come from an optional TOML file; every section has defaults so
//! the assistant runs with no file at all. Credentials are never read from
//! the file: each section names the environment variable that holds its key
//! (`api_key_env`), and [`Credentials::from_env`] resolves them once at
//! startup.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3000"
//! init_endpoint = true            # expose POST /api/init-knowledge
//!
//! [embedding]
//! provider = "gemini"            # gemini | openai | disabled
//! model = "text-embedding-004"
//! dims = 768
//!
//! [vector_store]
//! index_name = "pabitra-knowledge"
//!
//! [chat]
//! model = "gemini-1.5-flash"
//!
//! [retrieval]
//! top_k = 3
//! history_window = 10
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Serve `POST /api/init-knowledge`. Each call re-embeds the whole
    /// knowledge base against the paid embedding API.
    #[serde(default = "default_init_endpoint")]
    pub init_endpoint: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            init_endpoint: default_init_endpoint(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_init_endpoint() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Base URL override (e.g. a proxy or an OpenAI-compatible server).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Return a zero vector instead of failing when the provider rejects the
    /// credential's authentication mode (HTTP 401/403).
    #[serde(default)]
    pub degrade_on_auth_failure: bool,
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dims: default_dims(),
            url: None,
            timeout_secs: default_embedding_timeout(),
            max_input_chars: default_max_input_chars(),
            degrade_on_auth_failure: false,
            api_key_env: default_gemini_key_env(),
        }
    }
}

fn default_embedding_provider() -> String {
    "gemini".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
fn default_dims() -> usize {
    768
}
fn default_embedding_timeout() -> u64 {
    15
}
fn default_max_input_chars() -> usize {
    8000
}
fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreConfig {
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Data-plane host. Resolved through the control plane when unset.
    #[serde(default)]
    pub index_host: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_control_url")]
    pub control_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_pinecone_key_env")]
    pub api_key_env: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            index_host: None,
            namespace: None,
            control_url: default_control_url(),
            api_version: default_api_version(),
            timeout_secs: default_store_timeout(),
            api_key_env: default_pinecone_key_env(),
        }
    }
}

fn default_index_name() -> String {
    "pabitra-knowledge".to_string()
}
fn default_control_url() -> String {
    "https://api.pinecone.io".to_string()
}
fn default_api_version() -> String {
    "2024-07".to_string()
}
fn default_store_timeout() -> u64 {
    10
}
fn default_pinecone_key_env() -> String {
    "PINECONE_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_provider")]
    pub provider: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: default_chat_model(),
            url: None,
            timeout_secs: default_chat_timeout(),
            api_key_env: default_gemini_key_env(),
        }
    }
}

fn default_chat_provider() -> String {
    "gemini".to_string()
}
fn default_chat_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_chat_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Query the store even when the query embedding is degraded.
    #[serde(default)]
    pub accept_degraded: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            history_window: default_history_window(),
            accept_degraded: false,
        }
    }
}

fn default_top_k() -> usize {
    3
}
fn default_history_window() -> usize {
    pobo_core::prompt::DEFAULT_HISTORY_WINDOW
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeConfig {
    /// Upsert degraded (zero) vectors instead of aborting initialization.
    #[serde(default)]
    pub allow_degraded: bool,
}

impl Config {
    /// Apply `PINECONE_INDEX_NAME` / `PINECONE_INDEX_HOST` overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = non_empty(lookup("PINECONE_INDEX_NAME")) {
            self.vector_store.index_name = name;
        }
        if let Some(host) = non_empty(lookup("PINECONE_INDEX_HOST")) {
            self.vector_store.index_host = Some(host);
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.embedding.provider.as_str() {
            "gemini" | "openai" | "disabled" => {}
            other => bail!(
                "Unknown embedding provider: '{}'. Must be gemini, openai, or disabled.",
                other
            ),
        }
        match self.chat.provider.as_str() {
            "gemini" | "disabled" => {}
            other => bail!(
                "Unknown chat provider: '{}'. Must be gemini or disabled.",
                other
            ),
        }
        if self.embedding.dims == 0 {
            bail!("embedding.dims must be > 0");
        }
        if self.embedding.max_input_chars == 0 {
            bail!("embedding.max_input_chars must be > 0");
        }
        if self.retrieval.top_k < 1 {
            bail!("retrieval.top_k must be >= 1");
        }
        if self.retrieval.history_window < 1 {
            bail!("retrieval.history_window must be >= 1");
        }
        if self.vector_store.index_name.trim().is_empty() {
            bail!("vector_store.index_name must not be empty");
        }
        Ok(())
    }
}

/// Parse and validate a config file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.apply_env_overrides(|k| std::env::var(k).ok());
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    tracing::debug!(path = %path.display(), "config file not found, using defaults");
    let mut config = Config::default();
    config.apply_env_overrides(|k| std::env::var(k).ok());
    config.validate()?;
    Ok(config)
}

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Service credentials resolved from the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub embedding: Option<ApiKey>,
    pub vector_store: Option<ApiKey>,
    pub chat: Option<ApiKey>,
}

impl Credentials {
    pub fn from_env(config: &Config) -> Self {
        Self::from_lookup(config, |k| std::env::var(k).ok())
    }

    /// Resolve credentials through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |name: &str| non_empty(lookup(name)).map(ApiKey);
        Self {
            embedding: key(&config.embedding.api_key_env),
            vector_store: key(&config.vector_store.api_key_env),
            chat: key(&config.chat.api_key_env),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
