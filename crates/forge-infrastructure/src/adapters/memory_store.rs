//! Reference `MemoryStore` adapter: an in-process, `DashMap`-backed
//! store partitioned by `Context`, standing in for an external semantic
//! memory service.

use async_trait::async_trait;
use dashmap::DashMap;
use forge_domain::entities::Pattern;
use forge_domain::error::Result;
use forge_domain::ports::{MemoryResult, MemoryStore};
use forge_domain::value_objects::Context;
use tokio_util::sync::CancellationToken;

struct PartitionState {
    successes: Vec<(String, Vec<Pattern>)>,
    failures: Vec<(String, u32)>,
}

impl Default for PartitionState {
    fn default() -> Self {
        Self { successes: Vec::new(), failures: Vec::new() }
    }
}

/// Substring relevance over recorded success summaries; `limit`-capped,
/// most-recent-first.
pub struct InMemoryMemoryStore {
    partitions: DashMap<String, PartitionState>,
}

impl InMemoryMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self { partitions: DashMap::new() }
    }
}

impl Default for InMemoryMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn search(
        &self,
        context: &Context,
        query: &str,
        limit: usize,
        cancel_token: CancellationToken,
    ) -> Result<Vec<MemoryResult>> {
        if cancel_token.is_cancelled() {
            return Err(forge_domain::Error::Cancelled);
        }
        let Some(partition) = self.partitions.get(context.as_str()) else {
            return Ok(Vec::new());
        };
        let query_lower = query.to_lowercase();
        let mut hits: Vec<MemoryResult> = partition
            .successes
            .iter()
            .rev()
            .filter(|(summary, _)| summary.to_lowercase().contains(&query_lower))
            .map(|(summary, _)| MemoryResult { summary: summary.clone(), relevance: 1.0 })
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn record_success(&self, context: &Context, summary: &str, patterns: &[Pattern]) -> Result<()> {
        self.partitions
            .entry(context.as_str().to_owned())
            .or_default()
            .successes
            .push((summary.to_owned(), patterns.to_vec()));
        Ok(())
    }

    async fn record_failure(&self, context: &Context, signature: &str, attempts: u32) -> Result<()> {
        self.partitions
            .entry(context.as_str().to_owned())
            .or_default()
            .failures
            .push((signature.to_owned(), attempts));
        Ok(())
    }
}
