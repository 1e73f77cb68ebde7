//! Durable job persistence port (SPEC_FULL §4.1a). `JobManager` persists
//! through this port before publishing the corresponding event, so a
//! `status()` read after an observed event is never stale relative to
//! storage.

use async_trait::async_trait;

use crate::entities::Job;
use crate::error::Result;
use crate::value_objects::JobId;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a freshly-created job.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Overwrite the stored record for `job.id` with its current state.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    async fn update(&self, job: &Job) -> Result<()>;

    /// Fetch one job by id.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::not_found`] if no job with this id
    /// is stored, or another error if the read fails.
    async fn get(&self, id: &JobId) -> Result<Job>;

    /// List all retained jobs.
    ///
    /// # Errors
    /// Returns an error if the read fails.
    async fn list(&self) -> Result<Vec<Job>>;

    /// Delete every job whose `completed_at` is at or before `cutoff`
    /// (SPEC_FULL §4.1b retention sweep). Returns the number deleted.
    ///
    /// # Errors
    /// Returns an error if the sweep fails.
    async fn delete_completed_before(&self, cutoff: chrono::DateTime<chrono::Utc>) -> Result<u64>;
}
