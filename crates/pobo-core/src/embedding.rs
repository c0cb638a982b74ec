//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, the [`Embedding`] outcome that makes degraded vectors visible
//! to callers, and pure helpers for input truncation and similarity.
//!
//! Concrete HTTP providers (Gemini, OpenAI-compatible) live in the `pobo`
//! app crate.

use async_trait::async_trait;

use crate::error::Result;

/// Result of a successful embedding call.
///
/// `Degraded` carries a placeholder vector (all zeros) of the right length.
/// It keeps the pipeline exercisable when the provider refuses the configured
/// authentication mode, but retrieval quality is gone, so callers decide
/// whether to accept it.
#[derive(Debug, Clone, PartialEq)]
pub enum Embedding {
    Embedded(Vec<f32>),
    Degraded(Vec<f32>),
}

impl Embedding {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Embedding::Degraded(_))
    }

    pub fn values(&self) -> &[f32] {
        match self {
            Embedding::Embedded(v) | Embedding::Degraded(v) => v,
        }
    }

    pub fn into_values(self) -> Vec<f32> {
        match self {
            Embedding::Embedded(v) | Embedding::Degraded(v) => v,
        }
    }
}

/// Trait for embedding providers.
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// across concurrent requests behind an `Arc`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-004"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `768`).
    fn dims(&self) -> usize;
    /// Whether a credential is available. An unconfigured provider fails
    /// every call with `NotConfigured`.
    fn is_configured(&self) -> bool {
        true
    }
    /// Embed a single non-empty text.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Zero vector returned in degraded mode.
pub fn zero_vector(dims: usize) -> Vec<f32> {
    vec![0.0; dims]
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
///
/// Long inputs must be shortened by the caller before embedding to respect
/// the external service's limits.
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`, or `0.0` for empty vectors, vectors of
/// different lengths, or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
