//! Inline `RoutedTool` adapters exposing `MemoryStore` and
//! `WorkspaceInspector` directly through the Router's explicit registry
//! (§9 "Dynamic plugin discovery of tools is replaced by an explicit
//! registry"), for request classes the Router's gate keeps inline
//! rather than backgrounding as a job.

use std::sync::Arc;

use async_trait::async_trait;
use forge_application::RoutedTool;
use forge_domain::ports::{MemoryStore, WorkspaceInspector};
use forge_domain::value_objects::Context;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// `tools/call` name `memory_search`: semantic lookup against the
/// `MemoryStore`, scoped to the workspace's derived [`Context`].
pub struct MemorySearchTool {
    memory_store: Arc<dyn MemoryStore>,
}

impl MemorySearchTool {
    #[must_use]
    pub fn new(memory_store: Arc<dyn MemoryStore>) -> Self {
        Self { memory_store }
    }
}

#[async_trait]
impl RoutedTool for MemorySearchTool {
    fn name(&self) -> &str {
        "memory_search"
    }

    async fn call(&self, args: Value) -> forge_domain::Result<Value> {
        let workspace_path = args.get("workspacePath").and_then(Value::as_str).unwrap_or(".");
        let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
        let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(5) as usize;

        let context = Context::derive(workspace_path)?;
        let results = self.memory_store.search(&context, query, limit, CancellationToken::new()).await?;

        Ok(json!({
            "results": results.iter().map(|r| json!({ "summary": r.summary, "relevance": r.relevance })).collect::<Vec<_>>(),
        }))
    }
}

/// `tools/call` name `summarize_workspace`: a shallow codebase summary,
/// useful for a caller deciding whether to request a scaffold or a
/// modification (§4.8).
pub struct SummarizeWorkspaceTool {
    workspace_inspector: Arc<dyn WorkspaceInspector>,
}

impl SummarizeWorkspaceTool {
    #[must_use]
    pub fn new(workspace_inspector: Arc<dyn WorkspaceInspector>) -> Self {
        Self { workspace_inspector }
    }
}

#[async_trait]
impl RoutedTool for SummarizeWorkspaceTool {
    fn name(&self) -> &str {
        "summarize_workspace"
    }

    async fn call(&self, args: Value) -> forge_domain::Result<Value> {
        let workspace_path = args.get("workspacePath").and_then(Value::as_str).unwrap_or(".");
        let summary = self.workspace_inspector.summarize(workspace_path, CancellationToken::new()).await?;
        Ok(serde_json::to_value(summary).unwrap_or(Value::Null))
    }
}
