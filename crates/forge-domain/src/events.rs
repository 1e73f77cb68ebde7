//! Progress events published as a job runs (§4.1 `subscribe`, §6
//! "Progress stream").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::JobId;

/// The kind of a [`JobEvent`] (§4.1 "`type ∈ {progress, thinking,
/// coding, validation, error, completed}`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobEventType {
    /// A generic progress update, not tied to a specific phase.
    Progress,
    /// The thinking phase started or produced guidance.
    Thinking,
    /// The generation phase started or produced a candidate.
    Coding,
    /// The validation phase started or produced a score.
    Validation,
    /// An unrecoverable error occurred.
    Error,
    /// The job reached a terminal state.
    Completed,
}

/// A single event published to a job's subscribers (§6 "Event
/// payload fields").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// The job this event belongs to.
    pub job_id: JobId,
    /// This event's kind.
    pub r#type: JobEventType,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// Human-readable description.
    pub message: String,
    /// Overall job progress percentage, when known.
    pub progress: Option<u8>,
    /// The relevant validation score, for `Validation`/`Completed` events.
    pub score: Option<u8>,
    /// The attempt this event pertains to, 1-based.
    pub attempt_index: Option<u32>,
}

impl JobEvent {
    /// Construct an event with only the required fields set.
    #[must_use]
    pub fn new(job_id: JobId, r#type: JobEventType, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            job_id,
            r#type,
            timestamp,
            message: message.into(),
            progress: None,
            score: None,
            attempt_index: None,
        }
    }

    /// Attach the overall progress percentage.
    #[must_use]
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach a validation score.
    #[must_use]
    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }

    /// Attach the attempt index this event pertains to.
    #[must_use]
    pub fn with_attempt_index(mut self, attempt_index: u32) -> Self {
        self.attempt_index = Some(attempt_index);
        self
    }
}
