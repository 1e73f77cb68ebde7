//! Port for publishing job progress events (§4.1 `subscribe`).
//! `RetryController` publishes through this port so it never depends on
//! the concrete fan-out mechanism (SPEC_FULL: `tokio::sync::broadcast`
//! per job, owned by `forge-infrastructure`).

use async_trait::async_trait;

use crate::events::JobEvent;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`. Never fails: a job with no subscriber attached
    /// drops or buffers the event per the publisher's own policy (§9
    /// "drop or buffer policy when no subscriber is present").
    async fn publish(&self, event: JobEvent);
}
