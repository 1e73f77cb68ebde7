//! Multi-model consensus validation (§4.4).

use std::sync::Arc;

use forge_domain::entities::{FileChange, Issue, PerModelValidation, Severity, ValidationResult};
use forge_domain::ports::{Validator, ValidatorOptions};
use tokio_util::sync::CancellationToken;

use crate::config::ValidationEnsembleConfig;

/// Number of validator models to run for `attempt_index` (§4.4
/// "Model count by iteration band").
#[must_use]
pub fn model_count_for_attempt(attempt_index: u32, available: usize) -> usize {
    let target = match attempt_index {
        1..=2 => 2,
        3..=4 => 3,
        _ => 5,
    };
    target.min(available).max(1)
}

/// Runs N validator models in parallel and merges their output.
pub struct ValidationEnsemble {
    validators: Vec<Arc<dyn Validator>>,
    config: ValidationEnsembleConfig,
}

impl ValidationEnsemble {
    #[must_use]
    pub fn new(validators: Vec<Arc<dyn Validator>>, config: ValidationEnsembleConfig) -> Self {
        Self { validators, config }
    }

    /// Validate `files` with the first `count` registered validators.
    ///
    /// Never returns `Err`: infrastructure failures are folded into a
    /// `ValidatorUnavailable` issue with `score = 0` (§4.4 "Failure
    /// semantics").
    pub async fn validate(
        &self,
        files: &[FileChange],
        language: &str,
        min_score: u8,
        count: usize,
        cancel_token: CancellationToken,
    ) -> ValidationResult {
        let active: Vec<&Arc<dyn Validator>> = self.validators.iter().take(count.max(1)).collect();

        if files.is_empty() {
            // §4.2 tie-break: empty/whitespace-only output fast-fails
            // without running validators.
            return ValidationResult {
                score: 0,
                passed: false,
                issues: vec![Issue::new(Severity::High, "empty_output", "generation produced no files")],
                models_used: Vec::new(),
                confidence: 0.0,
                per_model: Vec::new(),
            };
        }

        let mut handles = Vec::new();
        for validator in &active {
            let validator = Arc::clone(validator);
            let files = files.to_vec();
            let language = language.to_owned();
            let cancel_token = cancel_token.clone();
            handles.push(async move {
                let started = tokio::time::Instant::now();
                let outcome = validator
                    .validate(&files, &language, ValidatorOptions { rules: None, cancel_token: Some(cancel_token) })
                    .await;
                (validator.name().to_owned(), started.elapsed().as_millis() as u64, outcome)
            });
        }
        let results = futures::future::join_all(handles).await;

        let mut per_model = Vec::new();
        let mut merged_issues: Vec<Issue> = Vec::new();
        let mut compile_failed = false;
        let mut all_failed = true;

        for (name, duration_ms, outcome) in results {
            match outcome {
                Ok(response) => {
                    all_failed = false;
                    if !response.compile_ok {
                        compile_failed = true;
                    }
                    for issue in &response.issues {
                        Self::merge_issue(&mut merged_issues, issue.clone());
                    }
                    per_model.push(PerModelValidation {
                        model: name,
                        score: response.score,
                        issues: response.issues,
                        duration_ms,
                    });
                }
                Err(_) => {
                    per_model.push(PerModelValidation {
                        model: name,
                        score: 0,
                        issues: vec![Issue::new(Severity::Medium, "validator_unavailable", "validator call failed")],
                        duration_ms,
                    });
                }
            }
        }

        if all_failed {
            let mut issues = merged_issues;
            issues.push(Issue::new(Severity::Medium, "validator_unavailable", "all validator models failed"));
            return ValidationResult {
                score: 0,
                passed: false,
                issues,
                models_used: per_model.iter().map(|p| p.model.clone()).collect(),
                confidence: 0.0,
                per_model,
            };
        }

        let scores: Vec<f64> = per_model.iter().map(|p| f64::from(p.score)).collect();
        let weights = Self::renormalized_weights(&self.config.default_weights, scores.len());
        let weighted_score = scores.iter().zip(&weights).map(|(s, w)| s * w).sum::<f64>();
        let score = if compile_failed { 0 } else { weighted_score.round().clamp(0.0, 10.0) as u8 };

        let confidence = Self::confidence(&scores);
        let has_critical = merged_issues.iter().any(|i| i.severity == Severity::Critical);
        let passed = score >= min_score && !has_critical;

        ValidationResult {
            score,
            passed,
            issues: merged_issues,
            models_used: per_model.iter().map(|p| p.model.clone()).collect(),
            confidence,
            per_model,
        }
    }

    fn renormalized_weights(default_weights: &[f64], count: usize) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        if count == default_weights.len() {
            return default_weights.to_vec();
        }
        vec![1.0 / count as f64; count]
    }

    /// `confidence = 1 − stdDev(scores)/5`, clipped to `[0, 1]`; `1.0` for
    /// a single model (§4.4).
    fn confidence(scores: &[f64]) -> f64 {
        if scores.len() <= 1 {
            return 1.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
        let std_dev = variance.sqrt();
        (1.0 - std_dev / 5.0).clamp(0.0, 1.0)
    }

    /// Merge `issue` into `merged`, matching by [`Issue::matches_for_merge`];
    /// the stronger severity wins and agreement count accumulates
    /// (§4.4 "Issue merging").
    fn merge_issue(merged: &mut Vec<Issue>, issue: Issue) {
        if let Some(existing) = merged.iter_mut().find(|m| m.matches_for_merge(&issue)) {
            existing.agreement_count += 1;
            if issue.severity > existing.severity {
                existing.severity = issue.severity;
            }
        } else {
            merged.push(issue);
        }
    }
}
