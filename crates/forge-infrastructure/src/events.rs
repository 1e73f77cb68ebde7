//! `EventPublisher` adapter: one `tokio::sync::broadcast` channel per
//! job, created on first subscribe and dropped once no receiver and no
//! further publish touches it (§4.1 `subscribe`, §9 "drop or buffer
//! policy when no subscriber is present": events published with no
//! subscriber are simply dropped, matching `broadcast`'s own semantics).

use async_trait::async_trait;
use dashmap::DashMap;
use forge_domain::events::JobEvent;
use forge_domain::ports::EventPublisher;
use forge_domain::value_objects::JobId;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Per-job broadcast hub. `subscribe` lazily creates a job's channel;
/// `publish` is a no-op (beyond the lazy creation) if nobody is
/// listening.
pub struct BroadcastEventPublisher {
    channels: DashMap<JobId, broadcast::Sender<JobEvent>>,
}

impl BroadcastEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self { channels: DashMap::new() }
    }

    /// Subscribe to `job_id`'s event stream, creating its channel if this
    /// is the first subscriber.
    #[must_use]
    pub fn subscribe(&self, job_id: &JobId) -> broadcast::Receiver<JobEvent> {
        self.channels
            .entry(job_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop a job's channel once it has reached a terminal state and its
    /// events are no longer useful to retain.
    pub fn forget(&self, job_id: &JobId) {
        self.channels.remove(job_id);
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: JobEvent) {
        if let Some(sender) = self.channels.get(&event.job_id) {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forge_domain::events::JobEventType;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let publisher = BroadcastEventPublisher::new();
        let job_id = JobId::new(Utc::now());
        let mut receiver = publisher.subscribe(&job_id);

        let event = JobEvent::new(job_id.clone(), JobEventType::Progress, "starting", Utc::now());
        publisher.publish(event).await;

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.job_id, job_id);
    }

    #[tokio::test]
    async fn publish_with_no_subscriber_is_dropped_silently() {
        let publisher = BroadcastEventPublisher::new();
        let job_id = JobId::new(Utc::now());
        let event = JobEvent::new(job_id, JobEventType::Progress, "starting", Utc::now());
        publisher.publish(event).await;
    }
}
