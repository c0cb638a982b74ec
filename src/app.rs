//! Application wiring: one set of clients built from config and shared by
//! the CLI commands and every HTTP handler.

use std::sync::Arc;

use pobo_core::chat::ChatModel;
use pobo_core::embedding::EmbeddingProvider;
use pobo_core::store::VectorStore;

use crate::chat::create_chat_model;
use crate::config::{Config, Credentials};
use crate::embedding::create_provider;
use crate::loader::KnowledgeLoader;
use crate::pinecone;
use crate::responder::{Responder, ResponderSettings};

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
    pub chat: Arc<dyn ChatModel>,
}

impl App {
    /// Build clients from `config` and credentials in the process environment.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let credentials = Credentials::from_env(&config);
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: Config, credentials: Credentials) -> anyhow::Result<Self> {
        let embedder = create_provider(&config.embedding, credentials.embedding)?;
        let store = pinecone::connect(&config.vector_store, credentials.vector_store)?;
        let chat = create_chat_model(&config.chat, credentials.chat)?;

        tracing::info!(
            embedding = embedder.is_configured(),
            vector_store = store.is_configured(),
            chat = chat.is_configured(),
            index = %config.vector_store.index_name,
            "clients configured"
        );

        Ok(Self::with_parts(config, embedder, store, chat))
    }

    /// Assemble an app from explicit clients.
    pub fn with_parts(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            embedder,
            store,
            chat,
        }
    }

    pub fn responder(&self) -> Responder {
        Responder::new(self.embedder.clone(), self.store.clone(), self.chat.clone())
            .with_settings(ResponderSettings::from_config(&self.config))
    }

    pub fn loader(&self) -> KnowledgeLoader {
        KnowledgeLoader::new(self.embedder.clone(), self.store.clone())
            .with_max_input_chars(self.config.embedding.max_input_chars)
            .with_allow_degraded(self.config.knowledge.allow_degraded)
    }

    /// True when retrieval can run; otherwise every reply uses fallback knowledge.
    pub fn retrieval_configured(&self) -> bool {
        self.store.is_configured() && self.embedder.is_configured()
    }
}
