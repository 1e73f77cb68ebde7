//! Core entities of the Generation Orchestration Engine (§3).

mod attempt;
mod file_change;
mod generation_context;
mod job;
mod session_learning;
mod thinking;
mod validation;
mod workflow_plan;

pub use attempt::{Attempt, Candidate, Decision, ThinkingStrategy};
pub use file_change::{ChangeType, FileChange};
pub use generation_context::{CodebaseSummary, GenerationContext, ScaffoldManifest, ScaffoldedFile};
pub use job::{
    Job, JobError, JobRequest, JobResult, JobState, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_SCORE, MAX_TASK_BYTES,
};
pub use session_learning::{LearningHints, Pattern, PatternStats, SessionLearning};
pub use thinking::ThinkingResult;
pub use validation::{Issue, PerModelValidation, Severity, ValidationResult};
pub use workflow_plan::{DurationClass, PlanStep, StepOutcome, WorkflowPlan};
