//! Port to the external workspace-summarization collaborator (§6
//! "`WorkspaceInspector.summarize`").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::entities::CodebaseSummary;
use crate::error::Result;

#[async_trait]
pub trait WorkspaceInspector: Send + Sync {
    /// Produce a shallow summary of `workspace_path`.
    ///
    /// # Errors
    /// Returns an error if the workspace path cannot be read.
    async fn summarize(&self, workspace_path: &str, cancel_token: CancellationToken) -> Result<CodebaseSummary>;
}
