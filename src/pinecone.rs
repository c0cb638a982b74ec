//! Pinecone-backed [`VectorStore`] gateway.
//!
//! Talks to the Pinecone REST data plane:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | upsert | `POST {host}/vectors/upsert` (batches of 100) |
//! | query | `POST {host}/query` with `includeMetadata: true` |
//! | describe stats | `POST {host}/describe_index_stats` |
//!
//! The data-plane host comes from `vector_store.index_host` when set;
//! otherwise it is looked up once through the control plane
//! (`GET {control_url}/indexes/{name}`) and cached for the life of the store.
//!
//! [`connect`] returns an [`UnconfiguredStore`] when no API key is present,
//! so a missing credential never reaches the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use pobo_core::models::{MetadataFilter, RecordMetadata, ScoredMatch, StoreStats, VectorRecord};
use pobo_core::store::{UnconfiguredStore, VectorStore};
use pobo_core::{RagError, Result};

use crate::config::{ApiKey, VectorStoreConfig};

/// Pinecone's per-request upsert limit for dense vectors.
const UPSERT_BATCH: usize = 100;

/// Build the vector store gateway for `config`.
///
/// # Errors
///
/// Only if the HTTP client cannot be built. A missing credential is not an
/// error: the returned store reports `is_configured() == false`.
pub fn connect(
    config: &VectorStoreConfig,
    api_key: Option<ApiKey>,
) -> anyhow::Result<Arc<dyn VectorStore>> {
    match api_key {
        Some(key) => Ok(Arc::new(PineconeStore::new(config, key)?)),
        None => {
            tracing::debug!(index = %config.index_name, "no vector store credential, gateway unconfigured");
            Ok(Arc::new(UnconfiguredStore))
        }
    }
}

/// Vector store gateway for one Pinecone index.
pub struct PineconeStore {
    client: reqwest::Client,
    api_key: ApiKey,
    index_name: String,
    control_url: String,
    api_version: String,
    namespace: Option<String>,
    timeout_secs: u64,
    host: OnceCell<String>,
}

impl PineconeStore {
    pub fn new(config: &VectorStoreConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let host = OnceCell::new();
        if let Some(h) = config.index_host.as_deref() {
            let _ = host.set(normalize_host(h));
        }

        Ok(Self {
            client,
            api_key,
            index_name: config.index_name.clone(),
            control_url: config.control_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            namespace: config.namespace.clone().filter(|ns| !ns.is_empty()),
            timeout_secs: config.timeout_secs,
            host,
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Api-Key", self.api_key.expose())
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    fn transport_error(&self, e: reqwest::Error) -> RagError {
        if e.is_timeout() {
            RagError::Timeout {
                operation: "vector store",
                millis: self.timeout_secs * 1000,
            }
        } else {
            RagError::VectorStore(format!("Pinecone request failed: {}", e))
        }
    }

    async fn read_json(&self, what: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::VectorStore(format!(
                "Pinecone {} failed with {}: {}",
                what,
                status,
                body.trim().chars().take(300).collect::<String>()
            )));
        }
        response.json().await.map_err(|e| {
            RagError::VectorStore(format!("Pinecone {} returned invalid JSON: {}", what, e))
        })
    }

    /// Data-plane host, resolved through the control plane on first use.
    async fn host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let url = format!("{}/indexes/{}", self.control_url, self.index_name);
                let response = self
                    .authorized(self.client.get(url))
                    .send()
                    .await
                    .map_err(|e| self.transport_error(e))?;
                let json = self.read_json("describe index", response).await?;
                let host = json.get("host").and_then(Value::as_str).ok_or_else(|| {
                    RagError::VectorStore(format!(
                        "index '{}' description has no host",
                        self.index_name
                    ))
                })?;
                tracing::debug!(index = %self.index_name, host, "resolved Pinecone index host");
                Ok::<String, RagError>(normalize_host(host))
            })
            .await?;
        Ok(host.as_str())
    }

    async fn post(&self, path: &str, what: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.host().await?, path);
        let response = self
            .authorized(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(what, response).await
    }

    fn with_namespace(&self, mut body: Value) -> Value {
        if let (Some(ns), Some(obj)) = (&self.namespace, body.as_object_mut()) {
            obj.insert("namespace".to_string(), Value::String(ns.clone()));
        }
        body
    }
}

/// Prefix `https://` unless a scheme is present; drop trailing slashes.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Render a [`MetadataFilter`] in Pinecone's filter language.
fn filter_json(filter: &MetadataFilter) -> Value {
    let names: Vec<&str> = filter.categories.iter().map(|c| c.as_str()).collect();
    match names.as_slice() {
        [single] => json!({ "category": { "$eq": single } }),
        _ => json!({ "category": { "$in": names } }),
    }
}

fn parse_matches(json: &Value) -> Result<Vec<ScoredMatch>> {
    let matches = json
        .get("matches")
        .and_then(Value::as_array)
        .ok_or_else(|| RagError::VectorStore("query response has no matches array".to_string()))?;

    let mut out = Vec::with_capacity(matches.len());
    for m in matches {
        let id = m
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| RagError::VectorStore("match without id".to_string()))?;
        let score = m.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
        let metadata: RecordMetadata = m
            .get("metadata")
            .cloned()
            .ok_or_else(|| RagError::VectorStore(format!("match '{}' has no metadata", id)))
            .and_then(|v| {
                serde_json::from_value(v).map_err(|e| {
                    RagError::VectorStore(format!("match '{}' has malformed metadata: {}", id, e))
                })
            })?;
        out.push(ScoredMatch {
            id: id.to_string(),
            score,
            metadata,
        });
    }
    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(out)
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut upserted = 0usize;
        for batch in records.chunks(UPSERT_BATCH) {
            let body = self.with_namespace(json!({ "vectors": batch }));
            let json = self.post("/vectors/upsert", "upsert", &body).await?;
            let count = json
                .get("upsertedCount")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    RagError::VectorStore("upsert response has no upsertedCount".to_string())
                })?;
            upserted += count as usize;
        }
        tracing::info!(index = %self.index_name, upserted, "upserted vectors");
        Ok(upserted)
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });
        if let (Some(f), Some(obj)) = (filter, body.as_object_mut()) {
            obj.insert("filter".to_string(), filter_json(f));
        }
        let body = self.with_namespace(body);
        let json = self.post("/query", "query", &body).await?;
        parse_matches(&json)
    }

    async fn describe_stats(&self) -> Result<StoreStats> {
        let json = self
            .post("/describe_index_stats", "describe_index_stats", &json!({}))
            .await?;
        let dimension = json.get("dimension").and_then(Value::as_u64).unwrap_or(0) as usize;
        let record_count = match &self.namespace {
            Some(ns) => json
                .get("namespaces")
                .and_then(|n| n.get(ns))
                .and_then(|n| n.get("vectorCount"))
                .and_then(Value::as_u64)
                .unwrap_or(0),
            None => json
                .get("totalVectorCount")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        };
        Ok(StoreStats {
            record_count,
            dimension,
        })
    }
}
