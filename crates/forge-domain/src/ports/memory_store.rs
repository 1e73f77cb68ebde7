//! Port to the external semantic memory collaborator (§6
//! "MemoryStore"). Scoped by `context`; the core never reads or writes
//! another context's partition (§5 "Shared-resource policy").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::entities::Pattern;
use crate::error::Result;
use crate::value_objects::Context;

/// One hit from [`MemoryStore::search`].
#[derive(Debug, Clone)]
pub struct MemoryResult {
    /// Free-form summary text.
    pub summary: String,
    /// Relevance score in `[0, 1]`.
    pub relevance: f64,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Semantic search scoped to `context`.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn search(
        &self,
        context: &Context,
        query: &str,
        limit: usize,
        cancel_token: CancellationToken,
    ) -> Result<Vec<MemoryResult>>;

    /// Record a successful job's summary and the patterns it relied on.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn record_success(&self, context: &Context, summary: &str, patterns: &[Pattern]) -> Result<()>;

    /// Record a failure signature and the attempts that produced it.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn record_failure(&self, context: &Context, signature: &str, attempts: u32) -> Result<()>;
}
