//! Error taxonomy for the retrieval path.
//!
//! Each variant maps to one failure class with its own recovery policy:
//!
//! | Variant | At retrieval | At initialization |
//! |---------|--------------|-------------------|
//! | [`RagError::NotConfigured`] | fall back, quietly | report "skipped" |
//! | [`RagError::EmbeddingService`] | fall back | abort the batch |
//! | [`RagError::VectorStore`] | fall back | abort the batch |
//! | [`RagError::DimensionMismatch`] | n/a | abort before upsert |
//! | [`RagError::ChatService`] | apology to the user | n/a |
//! | [`RagError::Timeout`] | same as the timed-out call | abort the batch |

use thiserror::Error;

/// Errors raised by the embedding, vector store, and chat seams.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RagError {
    /// A required credential or setting is absent. Expected in fallback mode.
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// The caller passed input the service cannot accept (e.g. empty text).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding call failed or returned malformed data.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// The vector database was unreachable, rejected auth, or returned malformed data.
    #[error("vector store error: {0}")]
    VectorStore(String),

    /// A vector's length does not match the collection dimensionality.
    #[error("dimension mismatch for '{id}': expected {expected}, got {actual}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// The chat-completion call failed or produced no text.
    #[error("chat service error: {0}")]
    ChatService(String),

    /// An external call exceeded its time budget.
    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u64 },
}

impl RagError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, RagError::NotConfigured(_))
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
