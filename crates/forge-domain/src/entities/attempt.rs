//! One iteration of the job retry loop (§3 "Attempt", §4.2).

use serde::{Deserialize, Serialize};

use super::file_change::FileChange;
use super::thinking::ThinkingResult;
use super::validation::ValidationResult;

/// Which thinking strategy produced an [`Attempt`]'s guidance (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThinkingStrategy {
    /// A single model thinks alone.
    Solo,
    /// Two models debate for one round each.
    DuoDebate,
    /// Three models think independently in parallel, then are merged.
    TrioParallel,
    /// Multiple models debate over several rounds.
    DebateRounds,
    /// Multiple models vote on a shared set of candidate approaches.
    Vote,
}

/// The outcome the retry loop recorded for an attempt (§4.2.i).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    /// The candidate passed validation; the job completes.
    Accept,
    /// The candidate failed validation but the job has budget left.
    Retry,
    /// The candidate failed repeatedly; escalate to a stronger model.
    Escalate,
    /// The retry budget is exhausted; the job fails.
    GiveUp,
}

/// The materialized output of a single generation call, prior to
/// validation (§3 "Attempt.candidate").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Files the generation call produced or modified.
    pub files: Vec<FileChange>,
    /// The model's raw, unparsed output (kept for diagnostics).
    pub raw_output: String,
    /// Tokens consumed producing this candidate, if reported by the model.
    pub tokens_used: Option<u64>,
}

/// One iteration of a job's retry loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based position within the job's `attempts` list.
    pub index: u32,
    /// The thinking strategy used to produce this attempt's guidance.
    pub thinking_strategy: ThinkingStrategy,
    /// The thinking phase's output, if the strategy ran (§4.2.a).
    pub thinking_result: Option<ThinkingResult>,
    /// Name of the model used to generate this attempt's candidate.
    pub generation_model: String,
    /// The generated candidate, once the generation phase completes.
    pub candidate: Option<Candidate>,
    /// The validation ensemble's merged result for this candidate.
    pub validation: Option<ValidationResult>,
    /// Wall-clock duration of the full attempt, in milliseconds.
    pub duration_ms: u64,
    /// The decision the retry loop made after validating this attempt.
    pub decision: Option<Decision>,
}

impl Attempt {
    /// Start a new attempt awaiting its thinking/generation/validation phases.
    #[must_use]
    pub fn started(index: u32, thinking_strategy: ThinkingStrategy, generation_model: impl Into<String>) -> Self {
        Self {
            index,
            thinking_strategy,
            thinking_result: None,
            generation_model: generation_model.into(),
            candidate: None,
            validation: None,
            duration_ms: 0,
            decision: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_attempt_has_no_outcome_yet() {
        let attempt = Attempt::started(1, ThinkingStrategy::Solo, "gpt-4o");
        assert!(attempt.candidate.is_none());
        assert!(attempt.decision.is_none());
    }
}
