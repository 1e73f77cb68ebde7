//! Deterministic generation-model ladder selector (§4.5).

use std::collections::HashMap;

use crate::config::EscalatorConfig;

/// Derive an error signature from a set of issue messages (§4.5
/// "`errorSignature` is derived from an attempt's issues").
#[must_use]
pub fn error_signature(issue_messages: &[String]) -> String {
    const KEYWORDS: &[&str] = &["null", "async", "injection", "cancellation", "compile"];
    let lowered: Vec<String> = issue_messages.iter().map(|m| m.to_lowercase()).collect();
    let mut hits: Vec<&str> = KEYWORDS
        .iter()
        .copied()
        .filter(|kw| lowered.iter().any(|m| m.contains(kw)))
        .collect();
    hits.sort_unstable();
    hits.dedup();
    if hits.is_empty() {
        "unclassified".to_owned()
    } else {
        hits.join("|")
    }
}

/// Picks a generation model for the next attempt (§4.5).
pub struct Escalator {
    config: EscalatorConfig,
}

impl Escalator {
    #[must_use]
    pub fn new(config: EscalatorConfig) -> Self {
        Self { config }
    }

    /// `(attemptIndex, errorSignatures, config) → modelName`.
    ///
    /// `signature_counts` maps each previously-seen error signature to how
    /// many times it has recurred at the current tier; `failed_tiers`
    /// lists tier indices already tried and failed with the signature
    /// that would otherwise select them.
    #[must_use]
    pub fn pick_model(
        &self,
        attempt_index: u32,
        signature_counts: &HashMap<String, u32>,
        failed_tiers: &[usize],
    ) -> &str {
        let mut tier_index = self.tier_for_attempt(attempt_index);

        // Jump one tier early if the current tier's dominant signature has
        // repeated >= threshold times.
        if signature_counts
            .values()
            .any(|&count| count >= self.config.repeat_jump_threshold)
        {
            tier_index = (tier_index + 1).min(self.config.tiers.len() - 1);
        }

        // Skip tiers already tried and failed with the same signature.
        while failed_tiers.contains(&tier_index) && tier_index + 1 < self.config.tiers.len() {
            tier_index += 1;
        }

        self.config.tiers[tier_index].model.as_str()
    }

    fn tier_for_attempt(&self, attempt_index: u32) -> usize {
        self.config
            .tiers
            .iter()
            .rposition(|tier| attempt_index >= tier.starts_at_attempt)
            .unwrap_or(0)
    }
}
