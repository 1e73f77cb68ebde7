//! Port the Router uses to enqueue a generation job without depending on
//! the concrete `JobManager` (§4.7 "Slow steps are enqueued as
//! background jobs").

use async_trait::async_trait;

use crate::entities::JobRequest;
use crate::error::Result;
use crate::value_objects::JobId;

#[async_trait]
pub trait JobLauncher: Send + Sync {
    /// Validate and persist `req` as a Queued job, then schedule it to run
    /// in the background. Returns immediately with the new job's id.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::invalid_request`] if `req` fails
    /// validation.
    async fn launch(&self, req: JobRequest) -> Result<JobId>;
}
