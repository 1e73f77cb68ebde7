//! Port to the external project-scaffold collaborator (§6
//! "`TemplateExecutor.scaffold`", §4.8).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::entities::ScaffoldedFile;
use crate::error::Result;

#[async_trait]
pub trait TemplateExecutor: Send + Sync {
    /// Scaffold `project_type` into `target_dir`, an isolated working
    /// directory owned by the executor (§5 "the Scaffolder writes to
    /// an isolated/temporary working directory provided by the
    /// `TemplateExecutor`").
    ///
    /// # Errors
    /// Returns an error if scaffolding fails or is cancelled.
    async fn scaffold(
        &self,
        project_type: &str,
        target_dir: &str,
        cancel_token: CancellationToken,
    ) -> Result<Vec<ScaffoldedFile>>;
}
