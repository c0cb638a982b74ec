//! Knowledge base initialization.
//!
//! Embeds the fixed record set and upserts it as one batch. The run is
//! all-or-nothing: any embedding failure, a degraded vector (unless allowed),
//! or a dimension mismatch aborts before anything is sent to the store.
//! Re-running replaces every record by id.

use std::sync::Arc;

use serde::Serialize;

use pobo_core::embedding::{truncate_for_embedding, EmbeddingProvider};
use pobo_core::knowledge::{knowledge_fingerprint, knowledge_records};
use pobo_core::models::{KnowledgeRecord, VectorRecord};
use pobo_core::store::{check_dimensions, VectorStore};
use pobo_core::{RagError, Result};

use crate::app::App;

/// Outcome of a successful initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Count reported by the store.
    pub upserted: usize,
    /// Number of records upserted with a degraded placeholder vector.
    pub degraded: usize,
    /// Hex SHA-256 over the ids and texts of the loaded records.
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    Populated(InitReport),
    /// The vector store is not configured; the responder serves fallback
    /// knowledge.
    Skipped,
}

pub struct KnowledgeLoader {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    max_input_chars: usize,
    allow_degraded: bool,
}

impl KnowledgeLoader {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            max_input_chars: 8000,
            allow_degraded: false,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn with_allow_degraded(mut self, allow_degraded: bool) -> Self {
        self.allow_degraded = allow_degraded;
        self
    }

    /// Embed and upsert the built-in knowledge records.
    pub async fn initialize(&self) -> Result<InitReport> {
        self.load(&knowledge_records()).await
    }

    /// Embed and upsert `records` as a single batch.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when the store has no credential (checked before any
    /// embedding call), otherwise the first embedding, dimension, or store
    /// error encountered.
    pub async fn load(&self, records: &[KnowledgeRecord]) -> Result<InitReport> {
        if !self.store.is_configured() {
            return Err(RagError::NotConfigured("vector store"));
        }

        tracing::info!(
            record_count = records.len(),
            model = self.embedder.model_name(),
            "embedding knowledge records"
        );

        let mut vectors = Vec::with_capacity(records.len());
        let mut degraded = 0usize;
        for record in records {
            let text = truncate_for_embedding(&record.text, self.max_input_chars);
            let embedding = self.embedder.embed(text).await.map_err(|e| {
                tracing::error!(id = %record.id, error = %e, "embedding failed, aborting initialization");
                e
            })?;

            if embedding.is_degraded() {
                if !self.allow_degraded {
                    return Err(RagError::EmbeddingService(format!(
                        "degraded embedding for record '{}'; refusing to upsert a placeholder vector",
                        record.id
                    )));
                }
                tracing::warn!(id = %record.id, "upserting degraded embedding");
                degraded += 1;
            }

            vectors.push(VectorRecord {
                id: record.id.clone(),
                values: embedding.into_values(),
                metadata: record.metadata(),
            });
        }

        check_dimensions(&vectors, self.embedder.dims())?;

        let upserted = self.store.upsert(&vectors).await?;
        let fingerprint = knowledge_fingerprint(records);
        tracing::info!(upserted, degraded, fingerprint = %fingerprint, "knowledge base initialized");

        Ok(InitReport {
            upserted,
            degraded,
            fingerprint,
        })
    }
}

/// Populate the vector store from the app's configured clients.
///
/// Returns [`InitStatus::Skipped`] when the vector store is not configured.
pub async fn initialize_knowledge(app: &App) -> Result<InitStatus> {
    if !app.store.is_configured() {
        tracing::info!("vector store not configured, skipping knowledge initialization");
        return Ok(InitStatus::Skipped);
    }
    app.loader().initialize().await.map(InitStatus::Populated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pobo_core::embedding::Embedding;
    use pobo_core::store::memory::InMemoryStore;
    use pobo_core::store::UnconfiguredStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as `[len, 1.0, ...]` and counts calls.
    struct LengthEmbedder {
        dims: usize,
        calls: AtomicUsize,
        degraded: bool,
    }

    impl LengthEmbedder {
        fn new(dims: usize) -> Self {
            Self {
                dims,
                calls: AtomicUsize::new(0),
                degraded: false,
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        fn model_name(&self) -> &str {
            "length"
        }
        fn dims(&self) -> usize {
            self.dims
        }
        async fn embed(&self, text: &str) -> Result<Embedding> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![1.0; self.dims];
            v[0] = text.chars().count() as f32;
            if self.degraded {
                Ok(Embedding::Degraded(vec![0.0; self.dims]))
            } else {
                Ok(Embedding::Embedded(v))
            }
        }
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_before_embedding() {
        let embedder = Arc::new(LengthEmbedder::new(4));
        let loader = KnowledgeLoader::new(embedder.clone(), Arc::new(UnconfiguredStore));
        let err = loader.initialize().await.unwrap_err();
        assert!(err.is_not_configured());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_upserts_every_record() {
        let embedder = Arc::new(LengthEmbedder::new(4));
        let store = Arc::new(InMemoryStore::new());
        let report = KnowledgeLoader::new(embedder.clone(), store.clone())
            .initialize()
            .await
            .unwrap();

        assert_eq!(report.upserted, 11);
        assert_eq!(report.degraded, 0);
        assert_eq!(report.fingerprint.len(), 64);
        assert_eq!(store.len(), 11);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 11);
        let doxpro = store.get("project-doxpro").unwrap();
        assert!(doxpro.metadata.text.starts_with("DoxPro"));
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_before_embedding() {
        let embedder = Arc::new(LengthEmbedder::new(2));
        let store = Arc::new(InMemoryStore::new());
        KnowledgeLoader::new(embedder, store.clone())
            .with_max_input_chars(20)
            .initialize()
            .await
            .unwrap();

        let skills = store.get("skills-programming").unwrap();
        assert_eq!(skills.values[0], 20.0);
        assert!(skills.metadata.text.chars().count() > 20, "metadata keeps full text");
    }

    #[tokio::test]
    async fn test_degraded_embedding_aborts_unless_allowed() {
        let mut embedder = LengthEmbedder::new(3);
        embedder.degraded = true;
        let embedder = Arc::new(embedder);
        let store = Arc::new(InMemoryStore::new());

        let err = KnowledgeLoader::new(embedder.clone(), store.clone())
            .initialize()
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::EmbeddingService(ref m) if m.contains("degraded")));
        assert!(store.is_empty());

        let report = KnowledgeLoader::new(embedder, store.clone())
            .with_allow_degraded(true)
            .initialize()
            .await
            .unwrap();
        assert_eq!(report.degraded, 11);
        assert_eq!(store.len(), 11);
    }
}
