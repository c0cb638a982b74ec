//! Retrieval-augmented responder.
//!
//! One call to [`Responder::respond`] runs the whole request path:
//!
//! ```text
//! message ──▶ embed ──▶ query top-k ──▶ matches? ──yes──▶ retrieved context
//!                │            │            │
//!                └── error ───┴── error ───┴──no──▶ fallback knowledge
//!
//! context + history + message ──▶ prompt ──▶ chat model ──▶ reply
//! ```
//!
//! Retrieval failures never reach the caller: they pick the fallback block
//! and are recorded as a [`FallbackReason`]. A chat failure becomes the
//! apology reply. `respond` therefore has no error path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pobo_core::chat::ChatModel;
use pobo_core::embedding::{truncate_for_embedding, EmbeddingProvider};
use pobo_core::models::ConversationTurn;
use pobo_core::prompt::{
    assemble_prompt, ContextSource, FallbackReason, PromptContext, APOLOGY_MESSAGE,
    DEFAULT_HISTORY_WINDOW,
};
use pobo_core::store::VectorStore;
use pobo_core::{RagError, Result};

use crate::config::Config;

/// Tunables for one [`Responder`].
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub top_k: usize,
    pub history_window: usize,
    pub accept_degraded: bool,
    pub max_input_chars: usize,
    pub embed_timeout: Duration,
    pub store_timeout: Duration,
    pub chat_timeout: Duration,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            history_window: DEFAULT_HISTORY_WINDOW,
            accept_degraded: false,
            max_input_chars: 8000,
            embed_timeout: Duration::from_secs(15),
            store_timeout: Duration::from_secs(10),
            chat_timeout: Duration::from_secs(30),
        }
    }
}

impl ResponderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            history_window: config.retrieval.history_window,
            accept_degraded: config.retrieval.accept_degraded,
            max_input_chars: config.embedding.max_input_chars,
            embed_timeout: Duration::from_secs(config.embedding.timeout_secs),
            store_timeout: Duration::from_secs(config.vector_store.timeout_secs),
            chat_timeout: Duration::from_secs(config.chat.timeout_secs),
        }
    }
}

/// The chat model call failed; the reply text is the apology.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatFailure {
    pub error: RagError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub context_source: ContextSource,
    pub failure: Option<ChatFailure>,
}

pub struct Responder {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chat: Arc<dyn ChatModel>,
    settings: ResponderSettings,
}

impl Responder {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            store,
            chat,
            settings: ResponderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ResponderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ResponderSettings {
        &self.settings
    }

    /// Answer `message` given the client-held `history`.
    pub async fn respond(&self, message: &str, history: &[ConversationTurn]) -> Reply {
        let context = self.retrieve(message).await;
        let prompt = assemble_prompt(&context, history, self.settings.history_window, message);

        let completion = with_timeout(
            "chat completion",
            self.settings.chat_timeout,
            self.chat.complete(&prompt),
        )
        .await;

        match completion {
            Ok(text) => Reply {
                text,
                context_source: context.source,
                failure: None,
            },
            Err(error) => {
                tracing::error!(
                    model = self.chat.model_name(),
                    error = %error,
                    "chat completion failed, replying with apology"
                );
                Reply {
                    text: APOLOGY_MESSAGE.to_string(),
                    context_source: context.source,
                    failure: Some(ChatFailure { error }),
                }
            }
        }
    }

    /// Build the prompt context for `message`, falling back to the static
    /// knowledge block on any retrieval failure.
    pub async fn retrieve(&self, message: &str) -> PromptContext {
        match self.try_retrieve(message).await {
            Ok(context) => context,
            Err(reason) => PromptContext::fallback(reason),
        }
    }

    async fn try_retrieve(&self, message: &str) -> std::result::Result<PromptContext, FallbackReason> {
        if !self.store.is_configured() || !self.embedder.is_configured() {
            tracing::debug!(
                store = self.store.is_configured(),
                embedder = self.embedder.is_configured(),
                "retrieval not configured, using fallback knowledge"
            );
            return Err(FallbackReason::NotConfigured);
        }

        let text = truncate_for_embedding(message, self.settings.max_input_chars);
        let embedding = with_timeout("embedding", self.settings.embed_timeout, self.embedder.embed(text))
            .await
            .map_err(|e| fallback_reason("embedding", &e, FallbackReason::EmbeddingFailed))?;

        if embedding.is_degraded() && !self.settings.accept_degraded {
            tracing::warn!(reason = ?FallbackReason::Degraded, "query embedding is degraded, using fallback knowledge");
            return Err(FallbackReason::Degraded);
        }

        if embedding.values().len() != self.embedder.dims() {
            tracing::warn!(
                model = self.embedder.model_name(),
                expected = self.embedder.dims(),
                actual = embedding.values().len(),
                "query embedding has the wrong dimension, using fallback knowledge"
            );
            return Err(FallbackReason::EmbeddingFailed);
        }

        let matches = with_timeout(
            "vector query",
            self.settings.store_timeout,
            self.store.query(embedding.values(), self.settings.top_k, None),
        )
        .await
        .map_err(|e| fallback_reason("vector query", &e, FallbackReason::StoreFailed))?;

        match PromptContext::from_matches(&matches) {
            Some(context) => {
                tracing::debug!(top_k = self.settings.top_k, matched = matches.len(), "retrieved context");
                Ok(context)
            }
            None => {
                tracing::warn!(reason = ?FallbackReason::NoMatches, "query returned no matches, using fallback knowledge");
                Err(FallbackReason::NoMatches)
            }
        }
    }
}

/// Classify a retrieval error and log it.
fn fallback_reason(stage: &'static str, error: &RagError, otherwise: FallbackReason) -> FallbackReason {
    let reason = match error {
        RagError::NotConfigured(_) => FallbackReason::NotConfigured,
        RagError::Timeout { .. } => FallbackReason::Timeout,
        _ => otherwise,
    };
    if reason == FallbackReason::NotConfigured {
        tracing::debug!(stage, error = %error, "retrieval not configured, using fallback knowledge");
    } else {
        tracing::warn!(stage, error = %error, reason = ?reason, "retrieval failed, using fallback knowledge");
    }
    reason
}

async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RagError::Timeout {
            operation,
            millis: limit.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pobo_core::embedding::Embedding;
    use pobo_core::models::{
        Category, MetadataFilter, RecordMetadata, ScoredMatch, StoreStats, VectorRecord,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use pobo_core::store::memory::InMemoryStore;
    use pobo_core::store::UnconfiguredStore;

    struct FixedEmbedder(Embedding);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn dims(&self) -> usize {
            self.0.values().len()
        }
        async fn embed(&self, _text: &str) -> Result<Embedding> {
            Ok(self.0.clone())
        }
    }

    /// Claims a 2-dim model but returns a vector of another length.
    struct MisreportingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for MisreportingEmbedder {
        fn model_name(&self) -> &str {
            "misreporting"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, _text: &str) -> Result<Embedding> {
            Ok(Embedding::Embedded(vec![1.0; 12]))
        }
    }

    struct SlowEmbedder;

    #[async_trait]
    impl EmbeddingProvider for SlowEmbedder {
        fn model_name(&self) -> &str {
            "slow"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, _text: &str) -> Result<Embedding> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Embedding::Embedded(vec![1.0, 0.0]))
        }
    }

    /// Wraps a store, delaying queries by `delay` and counting them.
    struct SlowStore {
        inner: Arc<InMemoryStore>,
        delay: Duration,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl VectorStore for SlowStore {
        async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
            self.inner.upsert(records).await
        }

        async fn query(
            &self,
            vector: &[f32],
            top_k: usize,
            filter: Option<&MetadataFilter>,
        ) -> Result<Vec<ScoredMatch>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.inner.query(vector, top_k, filter).await
        }

        async fn describe_stats(&self) -> Result<StoreStats> {
            self.inner.describe_stats().await
        }
    }

    struct SlowChat;

    #[async_trait]
    impl ChatModel for SlowChat {
        fn model_name(&self) -> &str {
            "slow"
        }
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".into())
        }
    }

    struct EchoChat;

    #[async_trait]
    impl ChatModel for EchoChat {
        fn model_name(&self) -> &str {
            "echo"
        }
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert(&[VectorRecord {
                id: "contact-info".into(),
                values: vec![1.0, 0.0],
                metadata: RecordMetadata {
                    text: "Email: write2pabitra@gmail.com".into(),
                    category: Category::Contact,
                    source: "Contact Details".into(),
                    timestamp: "2025-01-01T00:00:00.000Z".into(),
                },
            }])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_retrieved_context_reaches_prompt() {
        let responder = Responder::new(
            Arc::new(FixedEmbedder(Embedding::Embedded(vec![1.0, 0.0]))),
            seeded_store().await,
            Arc::new(EchoChat),
        );
        let reply = responder.respond("How do I contact him?", &[]).await;
        assert_eq!(
            reply.context_source,
            ContextSource::Retrieved {
                ids: vec!["contact-info".into()]
            }
        );
        assert!(reply.text.contains("Relevant Information:\nEmail: write2pabitra@gmail.com"));
        assert!(reply.failure.is_none());
    }

    #[tokio::test]
    async fn test_degraded_query_embedding_falls_back() {
        let embedder = Arc::new(FixedEmbedder(Embedding::Degraded(vec![0.0, 0.0])));
        let store = seeded_store().await;

        let strict = Responder::new(embedder.clone(), store.clone(), Arc::new(EchoChat));
        let ctx = strict.retrieve("hello").await;
        assert_eq!(
            ctx.source,
            ContextSource::Fallback {
                reason: FallbackReason::Degraded
            }
        );

        let lenient = Responder::new(embedder, store, Arc::new(EchoChat)).with_settings(
            ResponderSettings {
                accept_degraded: true,
                ..Default::default()
            },
        );
        assert!(!lenient.retrieve("hello").await.source.is_fallback());
    }

    #[tokio::test]
    async fn test_unconfigured_store_uses_fallback() {
        let responder = Responder::new(
            Arc::new(FixedEmbedder(Embedding::Embedded(vec![1.0, 0.0]))),
            Arc::new(UnconfiguredStore),
            Arc::new(EchoChat),
        );
        let reply = responder.respond("Hi", &[]).await;
        assert_eq!(
            reply.context_source,
            ContextSource::Fallback {
                reason: FallbackReason::NotConfigured
            }
        );
        assert!(reply.text.contains("Knowledge Base:\nPABITRA JIBAN MAITY"));
    }

    #[tokio::test]
    async fn test_chat_timeout_becomes_apology() {
        let responder = Responder::new(
            Arc::new(FixedEmbedder(Embedding::Embedded(vec![1.0, 0.0]))),
            seeded_store().await,
            Arc::new(SlowChat),
        )
        .with_settings(ResponderSettings {
            chat_timeout: Duration::from_millis(50),
            ..Default::default()
        });

        let reply = responder.respond("Hi", &[]).await;
        assert_eq!(reply.text, APOLOGY_MESSAGE);
        assert!(matches!(
            reply.failure,
            Some(ChatFailure {
                error: RagError::Timeout {
                    operation: "chat completion",
                    ..
                }
            })
        ));
    }

    #[tokio::test]
    async fn test_wrong_dimension_query_vector_falls_back_without_querying() {
        let store = Arc::new(SlowStore {
            inner: seeded_store().await,
            delay: Duration::ZERO,
            queries: AtomicUsize::new(0),
        });
        let responder = Responder::new(
            Arc::new(MisreportingEmbedder),
            store.clone(),
            Arc::new(EchoChat),
        );

        let ctx = responder.retrieve("hello").await;
        assert_eq!(
            ctx.source,
            ContextSource::Fallback {
                reason: FallbackReason::EmbeddingFailed
            }
        );
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embed_timeout_falls_back() {
        let responder = Responder::new(
            Arc::new(SlowEmbedder),
            seeded_store().await,
            Arc::new(EchoChat),
        )
        .with_settings(ResponderSettings {
            embed_timeout: Duration::from_millis(50),
            ..Default::default()
        });

        let reply = responder.respond("Hi", &[]).await;
        assert_eq!(
            reply.context_source,
            ContextSource::Fallback {
                reason: FallbackReason::Timeout
            }
        );
        assert!(reply.text.contains("Knowledge Base:\nPABITRA JIBAN MAITY"));
        assert!(reply.failure.is_none());
    }

    #[tokio::test]
    async fn test_store_timeout_falls_back() {
        let store = Arc::new(SlowStore {
            inner: seeded_store().await,
            delay: Duration::from_secs(5),
            queries: AtomicUsize::new(0),
        });
        let responder = Responder::new(
            Arc::new(FixedEmbedder(Embedding::Embedded(vec![1.0, 0.0]))),
            store.clone(),
            Arc::new(EchoChat),
        )
        .with_settings(ResponderSettings {
            store_timeout: Duration::from_millis(50),
            ..Default::default()
        });

        let ctx = responder.retrieve("Hi").await;
        assert_eq!(
            ctx.source,
            ContextSource::Fallback {
                reason: FallbackReason::Timeout
            }
        );
        assert_eq!(store.queries.load(Ordering::SeqCst), 1);
    }
}
