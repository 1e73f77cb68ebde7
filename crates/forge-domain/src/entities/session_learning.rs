//! Per-job, in-memory adaptive learning state (§4.6, §3
//! "SessionLearning").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named stylistic or structural convention detected in a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pattern(pub String);

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observed success/failure counts for one [`Pattern`] within a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    /// Number of attempts where this pattern correlated with success.
    pub success_count: u32,
    /// Number of attempts where this pattern correlated with a reported issue.
    pub failure_count: u32,
}

impl PatternStats {
    /// `success / (success + failure)`, or `0.0` with no observations.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            0.0
        } else {
            f64::from(self.success_count) / f64::from(total)
        }
    }

    /// `failure / (success + failure)`, or `0.0` with no observations.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            0.0
        } else {
            f64::from(self.failure_count) / f64::from(total)
        }
    }

    /// "working" per §3: `success_rate >= 0.6` with `>= 2` observations.
    #[must_use]
    pub fn is_working(&self) -> bool {
        self.success_count + self.failure_count >= 2 && self.success_rate() >= 0.6
    }

    /// "failing" per §3: `failure_rate >= 0.6` with `>= 2` observations.
    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.success_count + self.failure_count >= 2 && self.failure_rate() >= 0.6
    }
}

/// Per-job adaptive learning tracker (§4.6).
///
/// Lives only for the duration of a job's run; summarized into
/// `MemoryStore` on completion, never shared across jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLearning {
    /// Observed stats for every pattern seen so far in this job.
    pub pattern_stats: HashMap<Pattern, PatternStats>,
}

/// Prioritized hints to fold into the next attempt's prompt (§4.6
/// "Outputs for the next attempt's prompt").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningHints {
    /// Up to 3 patterns to emphasize.
    pub emphasize: Vec<Pattern>,
    /// Up to 3 patterns to avoid.
    pub avoid: Vec<Pattern>,
    /// Present once `attempt_index > 2`: "try the minimal implementation
    /// that compiles, then enhance".
    pub simplify_hint: Option<String>,
}

impl SessionLearning {
    /// Record an observation for `pattern`: a success if it was already
    /// classified as working in this session, a failure if its name
    /// appears (case-insensitive substring) in `issue_texts`, otherwise
    /// unchanged (§4.6 "On each attempt").
    pub fn observe(&mut self, pattern: &Pattern, issue_texts: &[String]) {
        let was_working = self
            .pattern_stats
            .get(pattern)
            .is_some_and(PatternStats::is_working);
        if was_working {
            self.pattern_stats.entry(pattern.clone()).or_default().success_count += 1;
            return;
        }
        let pattern_lower = pattern.0.to_lowercase();
        let appears_in_issue = issue_texts
            .iter()
            .any(|text| text.to_lowercase().contains(&pattern_lower));
        if appears_in_issue {
            self.pattern_stats.entry(pattern.clone()).or_default().failure_count += 1;
        }
    }

    /// Derive this attempt's hints for the next prompt.
    #[must_use]
    pub fn hints(&self, next_attempt_index: u32) -> LearningHints {
        let mut emphasize: Vec<_> = self
            .pattern_stats
            .iter()
            .filter(|(_, s)| s.is_working())
            .map(|(p, _)| p.clone())
            .collect();
        emphasize.sort();
        emphasize.truncate(3);

        let mut avoid: Vec<_> = self
            .pattern_stats
            .iter()
            .filter(|(_, s)| s.is_failing())
            .map(|(p, _)| p.clone())
            .collect();
        avoid.sort();
        avoid.truncate(3);

        let simplify_hint = (next_attempt_index > 2)
            .then(|| "try the minimal implementation that compiles, then enhance".to_owned());

        LearningHints {
            emphasize,
            avoid,
            simplify_hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_pattern_requires_two_observations_and_rate() {
        let mut stats = PatternStats::default();
        stats.success_count = 1;
        assert!(!stats.is_working());
        stats.success_count = 2;
        assert!(stats.is_working());
    }

    #[test]
    fn observe_counts_failure_only_on_issue_text_match() {
        let mut learning = SessionLearning::default();
        let pattern = Pattern::from("repository-pattern");
        learning.observe(&pattern, &["uses repository pattern incorrectly".to_owned()]);
        learning.observe(&pattern, &["uses repository pattern incorrectly".to_owned()]);
        let stats = learning.pattern_stats.get(&pattern).unwrap();
        assert_eq!(stats.failure_count, 2);
        assert_eq!(stats.success_count, 0);
    }

    #[test]
    fn simplify_hint_appears_after_attempt_two() {
        let learning = SessionLearning::default();
        assert!(learning.hints(2).simplify_hint.is_none());
        assert!(learning.hints(3).simplify_hint.is_some());
    }
}
