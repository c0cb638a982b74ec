//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use pobo::app::App;
use pobo::config::Config;
use pobo_core::chat::ChatModel;
use pobo_core::embedding::{Embedding, EmbeddingProvider};
use pobo_core::models::{MetadataFilter, ScoredMatch, StoreStats, VectorRecord};
use pobo_core::store::memory::InMemoryStore;
use pobo_core::store::VectorStore;
use pobo_core::{RagError, Result};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "the", "of", "in", "on", "at", "to", "for", "from", "by", "with", "is",
    "are", "was", "were", "what", "which", "who", "how", "have", "has", "had", "you", "your",
    "he", "his", "her", "they", "their", "me", "my", "do", "does", "did", "about", "using",
];

/// Topic vocabularies, one leading dimension each.
const CONCEPTS: &[&[&str]] = &[
    &[
        "ai", "llm", "gpt", "generative", "gen", "chatbot", "rag", "prompt", "llama", "bedrock",
        "hugging", "model", "intelligent",
    ],
    &[
        "project", "tool", "dashboard", "bot", "product", "built", "developed", "designed",
        "deployed",
    ],
    &[
        "skill", "language", "programming", "python", "java", "javascript", "typescript",
        "react", "sql", "docker", "kubernetes",
    ],
    &[
        "experience", "job", "role", "developer", "associate", "senior", "company", "employer",
        "leadership",
    ],
    &[
        "education", "degree", "bachelor", "diploma", "school", "institute", "study", "studied",
        "university", "college",
    ],
    &["contact", "email", "mobile", "phone", "linkedin", "github", "reach"],
    &["award", "achievement", "recognition", "kudo", "prize"],
];

const RESIDUAL_BUCKETS: usize = 256;

/// Deterministic embedder: concept counts (square-rooted) plus hashed
/// residual tokens, L2-normalized. Similar wording lands close together.
pub struct ConceptEmbedder {
    calls: AtomicUsize,
}

impl ConceptEmbedder {
    pub const DIMS: usize = 7 + RESIDUAL_BUCKETS;

    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| w.len() >= 2 && !STOP_WORDS.contains(w))
            .map(|w| {
                if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
                    w[..w.len() - 1].to_string()
                } else {
                    w.to_string()
                }
            })
            .collect()
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; Self::DIMS];
        for token in Self::tokens(text) {
            match CONCEPTS.iter().position(|words| words.contains(&token.as_str())) {
                Some(i) => v[i] += 1.0,
                None => {
                    let digest = Sha256::digest(token.as_bytes());
                    v[CONCEPTS.len() + digest[0] as usize] += 0.25;
                }
            }
        }
        for x in v.iter_mut().take(CONCEPTS.len()) {
            *x = x.sqrt();
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for ConceptEmbedder {
    fn model_name(&self) -> &str {
        "concept-test"
    }
    fn dims(&self) -> usize {
        Self::DIMS
    }
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            return Err(RagError::InvalidInput("text to embed must not be empty".into()));
        }
        Ok(Embedding::Embedded(Self::vector(text)))
    }
}

/// Fails after `succeed_first` successful calls.
pub struct FailingEmbedder {
    succeed_first: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn always() -> Self {
        Self::after(0)
    }

    pub fn after(succeed_first: usize) -> Self {
        Self {
            succeed_first,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }
    fn dims(&self) -> usize {
        ConceptEmbedder::DIMS
    }
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.succeed_first {
            Ok(Embedding::Embedded(ConceptEmbedder::vector(text)))
        } else {
            Err(RagError::EmbeddingService("embedding API error 500".into()))
        }
    }
}

/// Embedder whose vectors do not match its declared dimension.
pub struct WrongDimsEmbedder;

#[async_trait]
impl EmbeddingProvider for WrongDimsEmbedder {
    fn model_name(&self) -> &str {
        "wrong-dims"
    }
    fn dims(&self) -> usize {
        768
    }
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Ok(Embedding::Embedded(vec![0.5; 12]))
    }
}

/// Returns a fixed reply and records every prompt.
pub struct ScriptedChat {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts().last().cloned().expect("no prompt recorded")
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    fn model_name(&self) -> &str {
        "scripted"
    }
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    fn model_name(&self) -> &str {
        "failing"
    }
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(RagError::ChatService(
            "Gemini API error 503: upstream secret-token rejected".into(),
        ))
    }
}

/// In-memory store that counts calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    upserts: AtomicUsize,
    queries: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(records).await
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(vector, top_k, filter).await
    }

    async fn describe_stats(&self) -> Result<StoreStats> {
        self.inner.describe_stats().await
    }
}

/// Store whose queries always fail.
pub struct BrokenStore;

#[async_trait]
impl VectorStore for BrokenStore {
    async fn upsert(&self, _records: &[VectorRecord]) -> Result<usize> {
        Err(RagError::VectorStore("Pinecone upsert failed with 401 Unauthorized".into()))
    }

    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        Err(RagError::VectorStore("Pinecone query failed with 401 Unauthorized".into()))
    }

    async fn describe_stats(&self) -> Result<StoreStats> {
        Err(RagError::VectorStore("Pinecone describe_index_stats failed".into()))
    }
}

/// App over the given fakes with default config.
pub fn test_app(
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chat: Arc<dyn ChatModel>,
) -> App {
    let mut config = Config::default();
    config.embedding.dims = ConceptEmbedder::DIMS;
    App::with_parts(config, embedder, store, chat)
}

/// Store populated with the knowledge base through the real loader.
pub async fn populated_store(embedder: Arc<ConceptEmbedder>) -> Arc<CountingStore> {
    let store = Arc::new(CountingStore::new());
    pobo::loader::KnowledgeLoader::new(embedder, store.clone())
        .initialize()
        .await
        .expect("knowledge load");
    store
}
