//! Output of a [`crate::ports::ThinkingEnsemble`] run (§4.3).

use serde::{Deserialize, Serialize};

/// Consolidated guidance and risks produced by a thinking strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingResult {
    /// Consolidated guidance text to fold into the next generation prompt.
    pub guidance: String,
    /// Deduplicated (case-insensitive, trimmed) list of identified risks.
    pub risks: Vec<String>,
    /// Per-model wall-clock duration, keyed by model name.
    pub duration_ms_by_model: Vec<(String, u64)>,
    /// Set when one or more ensemble members failed/timed out and the
    /// strategy proceeded with the remainder (§4.3 "degrades
    /// gracefully").
    pub degraded: bool,
}

impl ThinkingResult {
    /// Merge `risks` into a case-insensitive-deduplicated, trimmed list.
    #[must_use]
    pub fn dedupe_risks(risks: Vec<String>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for risk in risks {
            let trimmed = risk.trim().to_owned();
            let key = trimmed.to_lowercase();
            if seen.insert(key) {
                out.push(trimmed);
            }
        }
        out
    }
}
