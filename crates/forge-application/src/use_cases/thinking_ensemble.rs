//! Multi-model guidance generation (§4.3).

use std::sync::Arc;
use std::time::Duration;

use forge_domain::entities::{ThinkingResult, ThinkingStrategy};
use forge_domain::ports::{ModelCallOptions, ModelRunner};
use tokio_util::sync::CancellationToken;

/// Select a thinking strategy for `attempt_index` by iteration band
/// (§4.2.3.a).
#[must_use]
pub fn select_strategy(attempt_index: u32) -> ThinkingStrategy {
    match attempt_index {
        1..=2 => ThinkingStrategy::Solo,
        3..=4 => ThinkingStrategy::DuoDebate,
        5..=6 => ThinkingStrategy::TrioParallel,
        7..=8 => ThinkingStrategy::DebateRounds,
        _ => ThinkingStrategy::Vote,
    }
}

/// Bias the next iteration's strategy one band ahead of `attempt_index`'s
/// natural band (§4.2 tie-break "bias next iteration toward a
/// stronger thinking strategy (jump ahead one band)").
#[must_use]
pub fn escalated_strategy(attempt_index: u32) -> ThinkingStrategy {
    match select_strategy(attempt_index) {
        ThinkingStrategy::Solo => ThinkingStrategy::DuoDebate,
        ThinkingStrategy::DuoDebate => ThinkingStrategy::TrioParallel,
        ThinkingStrategy::TrioParallel => ThinkingStrategy::DebateRounds,
        ThinkingStrategy::DebateRounds | ThinkingStrategy::Vote => ThinkingStrategy::Vote,
    }
}

/// Number of models a strategy requires (§4.3 table).
#[must_use]
pub fn model_count(strategy: ThinkingStrategy) -> usize {
    match strategy {
        ThinkingStrategy::Solo => 1,
        ThinkingStrategy::DuoDebate => 2,
        ThinkingStrategy::TrioParallel | ThinkingStrategy::DebateRounds | ThinkingStrategy::Vote => 3,
    }
}

/// Pull `--- RISK: <text>` lines out of a model's raw output (same
/// marker-line convention as `candidate_parser`'s `--- FILE:` blocks).
fn extract_risks(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("--- RISK:").map(|risk| risk.trim().to_owned()))
        .collect()
}

/// Runs one of the thinking protocols over a pool of thinking models.
pub struct ThinkingEnsemble {
    model_runner: Arc<dyn ModelRunner>,
    per_call_timeout: Duration,
    strategy_timeout: Duration,
}

impl ThinkingEnsemble {
    #[must_use]
    pub fn new(model_runner: Arc<dyn ModelRunner>, per_call_timeout: Duration, strategy_timeout: Duration) -> Self {
        Self { model_runner, per_call_timeout, strategy_timeout }
    }

    /// Run `strategy` over `models` (truncated/cycled to the strategy's
    /// required count) for `prompt`.
    ///
    /// # Errors
    /// Returns an error only for `Solo`, when its single model call fails
    /// (§4.3 "Solo → fails the attempt with a `ThinkingError`"). All
    /// other strategies degrade gracefully and never fail outright.
    pub async fn run(
        &self,
        strategy: ThinkingStrategy,
        models: &[String],
        prompt: &str,
        cancel_token: CancellationToken,
    ) -> forge_domain::Result<ThinkingResult> {
        let needed = model_count(strategy);
        let roster: Vec<String> = (0..needed)
            .map(|i| models.get(i % models.len().max(1)).cloned().unwrap_or_else(|| "default-thinker".to_owned()))
            .collect();

        let deadline = tokio::time::Instant::now() + self.strategy_timeout;

        match strategy {
            ThinkingStrategy::Solo => self.run_solo(&roster[0], prompt, &cancel_token).await,
            ThinkingStrategy::DuoDebate => Ok(self.run_duo_debate(&roster, prompt, &cancel_token, deadline).await),
            ThinkingStrategy::TrioParallel => {
                Ok(self.run_trio_parallel(&roster, prompt, &cancel_token, deadline).await)
            }
            ThinkingStrategy::DebateRounds => {
                Ok(self.run_debate_rounds(&roster, prompt, &cancel_token, deadline).await)
            }
            ThinkingStrategy::Vote => Ok(self.run_vote(&roster, prompt, &cancel_token, deadline).await),
        }
    }

    async fn call(&self, model: &str, prompt: &str, cancel_token: &CancellationToken) -> forge_domain::Result<(String, u64)> {
        let options = ModelCallOptions {
            max_tokens: 2048,
            temperature: 0.4,
            context_window: 8192,
            cancel_token: cancel_token.clone(),
        };
        let started = tokio::time::Instant::now();
        let response = tokio::time::timeout(self.per_call_timeout, self.model_runner.invoke(model, prompt, options))
            .await
            .map_err(|_| forge_domain::Error::model_unavailable(format!("{model} timed out")))??;
        Ok((response.text, started.elapsed().as_millis() as u64))
    }

    async fn run_solo(&self, model: &str, prompt: &str, cancel_token: &CancellationToken) -> forge_domain::Result<ThinkingResult> {
        let (text, duration_ms) = self.call(model, prompt, cancel_token).await?;
        let risks = ThinkingResult::dedupe_risks(extract_risks(&text));
        Ok(ThinkingResult {
            guidance: text,
            risks,
            duration_ms_by_model: vec![(model.to_owned(), duration_ms)],
            degraded: false,
        })
    }

    async fn run_duo_debate(
        &self,
        models: &[String],
        prompt: &str,
        cancel_token: &CancellationToken,
        _deadline: tokio::time::Instant,
    ) -> ThinkingResult {
        let mut durations = Vec::new();
        let mut degraded = false;

        let proposal = match self.call(&models[0], prompt, cancel_token).await {
            Ok((text, ms)) => {
                durations.push((models[0].clone(), ms));
                text
            }
            Err(_) => {
                degraded = true;
                String::new()
            }
        };

        let proposal_risks = extract_risks(&proposal);
        let critique_prompt = format!("{prompt}\n\nProposal from {}:\n{proposal}\n\nCritique and reconcile.", models[0]);
        let guidance = match self.call(&models[1], &critique_prompt, cancel_token).await {
            Ok((text, ms)) => {
                durations.push((models[1].clone(), ms));
                text
            }
            Err(_) => {
                degraded = true;
                proposal
            }
        };

        let mut risks = proposal_risks;
        risks.extend(extract_risks(&guidance));

        ThinkingResult {
            guidance,
            risks: ThinkingResult::dedupe_risks(risks),
            duration_ms_by_model: durations,
            degraded,
        }
    }

    async fn run_trio_parallel(
        &self,
        models: &[String],
        prompt: &str,
        cancel_token: &CancellationToken,
        _deadline: tokio::time::Instant,
    ) -> ThinkingResult {
        let mut handles = Vec::new();
        for model in models {
            let model = model.clone();
            let prompt = prompt.to_owned();
            let cancel_token = cancel_token.clone();
            handles.push(async move { (model.clone(), self.call(&model, &prompt, &cancel_token).await) });
        }
        let results = futures::future::join_all(handles).await;

        let mut points = Vec::new();
        let mut risks = Vec::new();
        let mut durations = Vec::new();
        let mut degraded = false;
        for (model, outcome) in results {
            match outcome {
                Ok((text, ms)) => {
                    durations.push((model, ms));
                    risks.extend(extract_risks(&text));
                    points.extend(text.lines().filter(|line| !line.trim().starts_with("--- RISK:")).map(str::to_owned));
                }
                Err(_) => degraded = true,
            }
        }

        let mut seen = std::collections::HashSet::new();
        points.retain(|p| seen.insert(p.trim().to_lowercase()));

        ThinkingResult {
            guidance: points.join("\n"),
            // §4.3 TrioParallel: "risks = union" across the three parallel calls.
            risks: ThinkingResult::dedupe_risks(risks),
            duration_ms_by_model: durations,
            degraded,
        }
    }

    async fn run_debate_rounds(
        &self,
        models: &[String],
        prompt: &str,
        cancel_token: &CancellationToken,
        deadline: tokio::time::Instant,
    ) -> ThinkingResult {
        let mut transcript = prompt.to_owned();
        let mut durations = Vec::new();
        let mut degraded = false;
        let mut final_round_risks = Vec::new();

        for round in 0..3 {
            if tokio::time::Instant::now() >= deadline {
                degraded = true;
                break;
            }
            final_round_risks.clear();
            for model in models {
                match self.call(model, &transcript, cancel_token).await {
                    Ok((text, ms)) => {
                        durations.push((model.clone(), ms));
                        final_round_risks.extend(extract_risks(&text));
                        transcript = format!("{transcript}\n\n[round {round}, {model}]\n{text}");
                    }
                    Err(_) => degraded = true,
                }
            }
        }

        ThinkingResult {
            guidance: transcript,
            // §4.3 DebateRounds: "final round's consolidated output".
            risks: ThinkingResult::dedupe_risks(final_round_risks),
            duration_ms_by_model: durations,
            degraded,
        }
    }

    async fn run_vote(
        &self,
        models: &[String],
        prompt: &str,
        cancel_token: &CancellationToken,
        _deadline: tokio::time::Instant,
    ) -> ThinkingResult {
        let mut ballots = Vec::new();
        let mut durations = Vec::new();
        let mut degraded = false;

        for model in models {
            match self.call(model, prompt, cancel_token).await {
                Ok((text, ms)) => {
                    durations.push((model.clone(), ms));
                    ballots.push(text);
                }
                Err(_) => degraded = true,
            }
        }

        let mut tally: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
        for ballot in &ballots {
            if let Some(first_line) = ballot.lines().next() {
                *tally.entry(first_line.trim().to_owned()).or_default() += 1;
            }
        }
        let winner = tally
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map_or_else(String::new, |(action, _)| action);

        let risks = ballots.iter().flat_map(|ballot| extract_risks(ballot)).collect();

        ThinkingResult {
            guidance: winner,
            risks: ThinkingResult::dedupe_risks(risks),
            duration_ms_by_model: durations,
            degraded,
        }
    }
}
