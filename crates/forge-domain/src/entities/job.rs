//! The `Job` aggregate (§3 "Job").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::value_objects::{Context, JobId};

use super::attempt::Attempt;
use super::file_change::FileChange;

/// Maximum accepted size of [`JobRequest::task`], in bytes (§3 "task:
/// opaque natural-language request (≤ 32 KiB)").
pub const MAX_TASK_BYTES: usize = 32 * 1024;

/// Default `maxIterations` when a [`JobRequest`] omits it.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default `minScore` when a [`JobRequest`] omits it.
pub const DEFAULT_MIN_SCORE: u8 = 8;

/// A validated request to create a job (§4.1 `create(req)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// The natural-language task.
    pub task: String,
    /// Target language, or `None` for `auto`.
    pub language: Option<String>,
    /// Absolute workspace path.
    pub workspace_path: String,
    /// Retry budget; defaults to [`DEFAULT_MAX_ITERATIONS`].
    pub max_iterations: Option<u32>,
    /// Acceptance score threshold; defaults to [`DEFAULT_MIN_SCORE`].
    pub min_score: Option<u8>,
    /// When `false`, `create` rejects the request with
    /// `WorkerPoolExhausted` rather than queueing it behind a full worker
    /// pool. Defaults to `true`.
    #[serde(default)]
    pub background: Option<bool>,
}

/// Lifecycle state of a [`Job`] (§3 "state").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    /// Waiting to be picked up by a worker slot.
    Queued,
    /// Actively running the retry loop.
    Running,
    /// Reached an accepted candidate.
    Completed,
    /// Exhausted its retry budget or hit an unrecoverable error.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
    /// Exceeded its wall-clock budget.
    TimedOut,
}

impl JobState {
    /// Whether this state is one of the four terminal states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::TimedOut
        )
    }
}

/// The accepted outcome of a completed job (§3 "result").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The accepted candidate's files.
    pub files: Vec<FileChange>,
    /// 1-based index of the attempt that was accepted.
    pub accepted_attempt_index: u32,
    /// That attempt's validation score.
    pub score: u8,
    /// That attempt's validation confidence.
    pub confidence: f64,
}

/// The terminal failure/cancellation detail of a job (§3 "error").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    /// The error taxonomy kind (§7).
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// The best partial result salvaged from prior attempts, if any.
    pub partial_result: Option<JobResult>,
}

/// An end-to-end generation request with its attempts, result, and
/// lifecycle (§3 "Job", GLOSSARY).
///
/// Pure data: owned exclusively by the infrastructure layer's
/// `JobManager`, which serializes all mutation and publishes read-only
/// copies to callers (§3 "Ownership").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Globally unique, time-sortable identifier.
    pub id: JobId,
    /// The opaque natural-language task.
    pub task: String,
    /// Target language, or `"auto"`.
    pub language: String,
    /// Absolute workspace path.
    pub workspace_path: String,
    /// Memory partition derived from `workspace_path`.
    pub context: Context,
    /// Retry budget.
    pub max_iterations: u32,
    /// Acceptance score threshold.
    pub min_score: u8,
    /// Current lifecycle state.
    pub state: JobState,
    /// Progress percentage, monotonically non-decreasing within a run.
    pub progress: u8,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job transitioned to `Running`.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Attempts run so far, in order. Append-only.
    pub attempts: Vec<Attempt>,
    /// Set iff `state == Completed`.
    pub result: Option<JobResult>,
    /// Set iff `state ∈ {Failed, TimedOut}` (also populated on some
    /// `Cancelled` transitions that carry a partial result).
    pub error: Option<JobError>,
}

impl Job {
    /// Construct a freshly-queued job from a validated request.
    #[must_use]
    pub fn queued(id: JobId, context: Context, req: &JobRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            task: req.task.clone(),
            language: req.language.clone().unwrap_or_else(|| "auto".to_owned()),
            workspace_path: req.workspace_path.clone(),
            context,
            max_iterations: req.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            min_score: req.min_score.unwrap_or(DEFAULT_MIN_SCORE),
            state: JobState::Queued,
            progress: 0,
            created_at,
            started_at: None,
            completed_at: None,
            attempts: Vec::new(),
            result: None,
            error: None,
        }
    }

    /// Validate a [`JobRequest`] per §4.1 `create` failure semantics.
    ///
    /// # Errors
    /// Returns an error message describing the first violated invariant.
    pub fn validate_request(req: &JobRequest) -> Result<(), String> {
        if req.workspace_path.trim().is_empty() {
            return Err("workspacePath is required".to_owned());
        }
        if req.task.len() > MAX_TASK_BYTES {
            return Err(format!(
                "task exceeds {MAX_TASK_BYTES} bytes ({} given)",
                req.task.len()
            ));
        }
        if let Some(max_iterations) = req.max_iterations {
            if max_iterations == 0 {
                return Err("maxIterations must be > 0".to_owned());
            }
        }
        if let Some(min_score) = req.min_score {
            if min_score > 10 {
                return Err("minScore must be in [0, 10]".to_owned());
            }
        }
        Ok(())
    }
}
