//! Chat-completion model abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// A hosted text-generation model.
///
/// One non-streaming call per prompt. Implementations must be `Send + Sync`
/// so the responder can share one instance across requests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    fn is_configured(&self) -> bool {
        true
    }

    /// Generate a reply for `prompt`. An empty completion is an error.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
