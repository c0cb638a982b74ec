//! In-memory [`VectorStore`] implementation for tests.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` for thread safety.
//! Query is brute-force cosine similarity over all stored vectors. Like a
//! managed index, the collection dimension is fixed by the first upsert and
//! later vectors of another length are rejected.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::models::{MetadataFilter, ScoredMatch, StoreStats, VectorRecord};

use super::VectorStore;

#[derive(Default)]
struct Collection {
    dimension: Option<usize>,
    records: HashMap<String, VectorRecord>,
}

/// In-memory vector store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Collection>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored record by id.
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        self.inner.read().ok()?.records.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|c| c.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RagError {
    RagError::VectorStore("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut coll = self.inner.write().map_err(|_| poisoned())?;
        let expected = match (coll.dimension, records.first()) {
            (Some(d), _) => d,
            (None, Some(first)) => first.values.len(),
            (None, None) => return Ok(0),
        };
        for r in records {
            if r.values.len() != expected {
                return Err(RagError::VectorStore(format!(
                    "vector '{}' has dimension {}, collection expects {}",
                    r.id,
                    r.values.len(),
                    expected
                )));
            }
        }
        coll.dimension = Some(expected);
        for r in records {
            coll.records.insert(r.id.clone(), r.clone());
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        let coll = self.inner.read().map_err(|_| poisoned())?;
        let mut matches: Vec<ScoredMatch> = coll
            .records
            .values()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.metadata)))
            .map(|r| ScoredMatch {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                metadata: r.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn describe_stats(&self) -> Result<StoreStats> {
        let coll = self.inner.read().map_err(|_| poisoned())?;
        Ok(StoreStats {
            record_count: coll.records.len() as u64,
            dimension: coll.dimension.unwrap_or(0),
        })
    }
}
