//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the gateway the loader and the responder
//! talk to. The production backend (Pinecone) lives in the `pobo` app crate;
//! this crate ships two backends that need no network:
//!
//! - [`UnconfiguredStore`]: what the gateway becomes when no credential is
//!   set. Every operation fails with `NotConfigured` without any I/O.
//! - [`memory::InMemoryStore`]: brute-force cosine store used as a test double.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::{RagError, Result};
use crate::models::{MetadataFilter, ScoredMatch, StoreStats, VectorRecord};

/// Abstract vector database gateway.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](VectorStore::upsert) | Insert or replace records by id |
/// | [`query`](VectorStore::query) | Top-K similarity search with optional filter |
/// | [`describe_stats`](VectorStore::describe_stats) | Record count and dimensionality |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// `false` when the gateway was built without credentials.
    fn is_configured(&self) -> bool {
        true
    }

    /// Insert or replace records. Idempotent by id.
    ///
    /// Returns the number of records the store reports as upserted.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Return up to `top_k` matches ordered by descending score.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>>;

    /// Collection diagnostics; not used on the request path.
    async fn describe_stats(&self) -> Result<StoreStats>;
}

/// Gateway state when the vector store credential is absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStore;

#[async_trait]
impl VectorStore for UnconfiguredStore {
    fn is_configured(&self) -> bool {
        false
    }

    async fn upsert(&self, _records: &[VectorRecord]) -> Result<usize> {
        Err(RagError::NotConfigured("vector store"))
    }

    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        Err(RagError::NotConfigured("vector store"))
    }

    async fn describe_stats(&self) -> Result<StoreStats> {
        Err(RagError::NotConfigured("vector store"))
    }
}

/// Check that every record has `expected` dimensions.
///
/// The store gateway never sees a mixed-dimension batch: callers run this
/// before `upsert`.
pub fn check_dimensions(records: &[VectorRecord], expected: usize) -> Result<()> {
    for r in records {
        if r.values.len() != expected {
            return Err(RagError::DimensionMismatch {
                id: r.id.clone(),
                expected,
                actual: r.values.len(),
            });
        }
    }
    Ok(())
}
