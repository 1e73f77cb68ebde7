//! Tunable parameters for the use cases in this crate. Loaded by
//! `forge-infrastructure`'s `figment`-based loader and passed down as
//! plain config structs — this crate has no knowledge of TOML/env.

use serde::{Deserialize, Serialize};

/// One tier of the Escalator's model ladder (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationTier {
    /// Model name to use while in this tier.
    pub model: String,
    /// Attempts at or after this index enter this tier (ladder is ordered
    /// ascending by `starts_at_attempt`).
    pub starts_at_attempt: u32,
}

/// Escalator configuration (§4.5 "Default ladder").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatorConfig {
    /// Ladder tiers, ordered ascending by `starts_at_attempt`.
    pub tiers: Vec<EscalationTier>,
    /// Repeat count of a signature at the current tier that triggers an
    /// early jump to the next tier (§4.5 "Adjustments").
    pub repeat_jump_threshold: u32,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                EscalationTier { model: "tier0-fast".to_owned(), starts_at_attempt: 1 },
                EscalationTier { model: "tier1-alternate".to_owned(), starts_at_attempt: 3 },
                EscalationTier { model: "tier2-premium-local".to_owned(), starts_at_attempt: 5 },
                EscalationTier { model: "tier3-strong".to_owned(), starts_at_attempt: 7 },
                EscalationTier { model: "tier4-strongest".to_owned(), starts_at_attempt: 9 },
            ],
            repeat_jump_threshold: 2,
        }
    }
}

/// ValidationEnsemble configuration (§4.4 "Model count by iteration
/// band", "Default weights").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationEnsembleConfig {
    /// Default weights for a full 5-model ensemble, ordered by the order
    /// validators are registered. Renormalized for fewer models.
    pub default_weights: Vec<f64>,
}

impl Default for ValidationEnsembleConfig {
    fn default() -> Self {
        Self {
            default_weights: vec![0.20, 0.25, 0.20, 0.20, 0.15],
        }
    }
}

/// RetryController configuration (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Minimum validation confidence required to accept a candidate
    /// (§4.2.i, default 0.7).
    pub confidence_threshold: f64,
    /// Per-model-call timeout within an ensemble (§4.3, default 30s).
    pub model_call_timeout_ms: u64,
    /// Overall thinking-strategy timeout (§4.3, default 60s).
    pub thinking_strategy_timeout_ms: u64,
    /// Per-job wall-clock budget (§4.1, default 1 hour).
    pub job_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            model_call_timeout_ms: 30_000,
            thinking_strategy_timeout_ms: 60_000,
            job_timeout_ms: 60 * 60 * 1000,
        }
    }
}

/// Router configuration (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Per-step timeout for steps awaited in-line (§4.7, default 10s).
    pub step_timeout_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { step_timeout_ms: 10_000 }
    }
}
