//! The core retry state machine (§4.2).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use forge_domain::entities::{
    Attempt, Candidate, Decision, FileChange, GenerationContext, Job, JobError, JobResult, Pattern, SessionLearning,
};
use forge_domain::error::{Error, ErrorKind};
use forge_domain::events::{JobEvent, JobEventType};
use forge_domain::ports::{EventPublisher, ModelCallOptions, ModelRunner, WorkspaceInspector};
use tokio_util::sync::CancellationToken;
use tracing::info_span;

use crate::config::RetryConfig;
use crate::use_cases::candidate_parser;
use crate::use_cases::dynamic_learner;
use crate::use_cases::escalator::{error_signature, Escalator};
use crate::use_cases::scaffolder::Scaffolder;
use crate::use_cases::thinking_ensemble::{escalated_strategy, select_strategy, ThinkingEnsemble};
use crate::use_cases::validation_ensemble::{model_count_for_attempt, ValidationEnsemble};

/// Why the retry loop returned (mirrors [`JobState`]'s terminal variants).
pub enum RunOutcome {
    Completed(JobResult),
    Failed(JobError),
    Cancelled(Option<JobResult>),
    TimedOut(JobError),
}

/// Detects stylistic/structural patterns present in a candidate, for the
/// `DynamicLearner` (§4.6 "externally-supplied pattern detections").
/// A trivial heuristic stand-in: file extensions and top-level directory
/// names double as pattern names.
fn detect_patterns(files: &[FileChange]) -> Vec<Pattern> {
    let mut names: Vec<String> = files
        .iter()
        .filter_map(|f| f.path.split('/').next().map(str::to_owned))
        .collect();
    names.sort();
    names.dedup();
    names.into_iter().map(Pattern).collect()
}

/// Runs the per-job iterate-until-accept loop.
pub struct RetryController {
    model_runner: Arc<dyn ModelRunner>,
    workspace_inspector: Arc<dyn WorkspaceInspector>,
    events: Arc<dyn EventPublisher>,
    thinking: ThinkingEnsemble,
    validation: ValidationEnsemble,
    escalator: Escalator,
    scaffolder: Scaffolder,
    config: RetryConfig,
    thinking_models: Vec<String>,
}

impl RetryController {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model_runner: Arc<dyn ModelRunner>,
        workspace_inspector: Arc<dyn WorkspaceInspector>,
        events: Arc<dyn EventPublisher>,
        thinking: ThinkingEnsemble,
        validation: ValidationEnsemble,
        escalator: Escalator,
        scaffolder: Scaffolder,
        config: RetryConfig,
        thinking_models: Vec<String>,
    ) -> Self {
        Self { model_runner, workspace_inspector, events, thinking, validation, escalator, scaffolder, config, thinking_models }
    }

    /// Drive `job` through the retry loop to a terminal outcome.
    ///
    /// `job` is mutated in place: attempts are appended, `progress`
    /// advances monotonically. The caller (`JobManager`) is responsible
    /// for persisting each mutation and transitioning `job.state`.
    pub async fn run(&self, job: &mut Job, cancel_token: CancellationToken) -> RunOutcome {
        let deadline = Utc::now() + chrono::Duration::milliseconds(self.config.job_timeout_ms as i64);

        let workspace_summary = match self
            .workspace_inspector
            .summarize(&job.workspace_path, cancel_token.clone())
            .await
        {
            Ok(summary) => summary,
            Err(err) => return RunOutcome::Failed(to_job_error(&err, None)),
        };

        let mut context = GenerationContext { codebase_summary: workspace_summary.clone(), ..GenerationContext::default() };

        match self
            .scaffolder
            .maybe_scaffold(&job.task, &job.workspace_path, &workspace_summary, cancel_token.clone())
            .await
        {
            Ok(Some(manifest)) => {
                context.existing_files = manifest.files.iter().map(Self::scaffolded_to_file_change).collect();
                context.scaffold_manifest = Some(manifest);
            }
            Ok(None) => {}
            Err(err) => return RunOutcome::Failed(to_job_error(&err, None)),
        }

        let mut session = SessionLearning::default();
        let mut signature_counts: HashMap<String, u32> = HashMap::new();
        let mut failed_tiers: Vec<usize> = Vec::new();
        let mut best: Option<(u8, JobResult)> = None;
        let mut strategy_override: Option<forge_domain::entities::ThinkingStrategy> = None;

        for attempt_index in 1..=job.max_iterations {
            let _span = info_span!("retry_attempt", job_id = %job.id, attempt_index).entered();

            if cancel_token.is_cancelled() {
                return RunOutcome::Cancelled(best.map(|(_, r)| r));
            }

            if Utc::now() >= deadline {
                let partial = best.map(|(_, r)| r);
                let job_error = JobError {
                    kind: ErrorKind::TimedOut,
                    message: format!("job exceeded its {}ms wall-clock budget", self.config.job_timeout_ms),
                    partial_result: partial,
                };
                self.publish(job, JobEventType::Error, &job_error.message, attempt_index, None, None).await;
                return RunOutcome::TimedOut(job_error);
            }

            self.publish(job, JobEventType::Progress, "starting attempt", attempt_index, None, None).await;

            let strategy = strategy_override.take().unwrap_or_else(|| select_strategy(attempt_index));
            let prompt_base = Self::build_prompt(job, &context, &session, attempt_index);

            self.publish(job, JobEventType::Thinking, "running thinking ensemble", attempt_index, None, None).await;
            let thinking_result = match self.thinking.run(strategy, &self.thinking_models, &prompt_base, cancel_token.clone()).await {
                Ok(result) => result,
                Err(err) => return RunOutcome::Failed(to_job_error(&err, best.map(|(_, r)| r))),
            };

            let model = self.escalator.pick_model(attempt_index, &signature_counts, &failed_tiers);
            let mut generation_prompt = format!("{prompt_base}\n\nGuidance:\n{}", thinking_result.guidance);
            if !thinking_result.risks.is_empty() {
                generation_prompt.push_str("\n\nRisks:\n");
                for risk in &thinking_result.risks {
                    generation_prompt.push_str(&format!("- {risk}\n"));
                }
            }

            self.publish(job, JobEventType::Coding, "invoking generation model", attempt_index, None, None).await;
            let generation = self
                .model_runner
                .invoke(
                    model,
                    &generation_prompt,
                    ModelCallOptions {
                        max_tokens: 4096,
                        temperature: 0.3,
                        context_window: 16384,
                        cancel_token: cancel_token.clone(),
                    },
                )
                .await;

            let mut attempt = Attempt::started(attempt_index, strategy, model);
            attempt.thinking_result = Some(thinking_result);

            let response = match generation {
                Ok(response) => response,
                Err(err) => {
                    attempt.decision = Some(Decision::Retry);
                    job.attempts.push(attempt);
                    self.advance_progress(job, attempt_index);
                    let _ = err;
                    continue;
                }
            };

            let parsed = candidate_parser::parse(&response.text);
            let files = match parsed {
                Ok(files) => files,
                Err(_) => {
                    attempt.candidate = Some(Candidate { files: Vec::new(), raw_output: response.text, tokens_used: response.tokens_used });
                    attempt.decision = Some(Decision::Retry);
                    job.attempts.push(attempt);
                    self.advance_progress(job, attempt_index);
                    continue;
                }
            };

            let merged = context.merged_with(&files);

            self.publish(job, JobEventType::Validation, "running validation ensemble", attempt_index, None, None).await;
            let count = model_count_for_attempt(attempt_index, usize::MAX);
            let validation = self.validation.validate(&merged, &job.language, job.min_score, count, cancel_token.clone()).await;

            attempt.candidate = Some(Candidate { files: files.clone(), raw_output: response.text, tokens_used: response.tokens_used });
            attempt.validation = Some(validation.clone());

            let detected = detect_patterns(&files);
            dynamic_learner::observe_attempt(&mut session, &detected, &validation.issues);

            let signature = error_signature(&validation.issues.iter().map(|i| i.message.clone()).collect::<Vec<_>>());
            *signature_counts.entry(signature).or_default() += 1;

            if cancel_token.is_cancelled() {
                attempt.decision = Some(Decision::Retry);
                job.attempts.push(attempt);
                return RunOutcome::Cancelled(best.map(|(_, r)| r));
            }

            let accepted =
                validation.passed && validation.score >= job.min_score && validation.confidence >= self.config.confidence_threshold;

            if accepted {
                attempt.decision = Some(Decision::Accept);
                let result = JobResult {
                    files,
                    accepted_attempt_index: attempt_index,
                    score: validation.score,
                    confidence: validation.confidence,
                };
                job.attempts.push(attempt);
                job.progress = 100;
                self.publish(job, JobEventType::Completed, "job completed", attempt_index, Some(result.score), None).await;
                return RunOutcome::Completed(result);
            }

            if validation.passed && validation.score >= job.min_score {
                // passed but under-confident: bias next iteration's
                // strategy one band ahead (§4.2 tie-break).
                strategy_override = Some(escalated_strategy(attempt_index));
            }

            let candidate_result = JobResult {
                files: files.clone(),
                accepted_attempt_index: attempt_index,
                score: validation.score,
                confidence: validation.confidence,
            };
            if best.as_ref().is_none_or(|(best_score, _)| validation.score >= *best_score) {
                best = Some((validation.score, candidate_result));
            }

            if attempt_index == job.max_iterations {
                attempt.decision = Some(Decision::GiveUp);
                job.attempts.push(attempt);
                job.progress = 100;
                let partial = best.map(|(_, r)| r);
                let job_error = JobError {
                    kind: ErrorKind::MaxIterations,
                    message: format!("exhausted {} attempts without an accepted candidate", job.max_iterations),
                    partial_result: partial,
                };
                self.publish(job, JobEventType::Error, &job_error.message, attempt_index, None, None).await;
                return RunOutcome::Failed(job_error);
            }

            attempt.decision = Some(Decision::Retry);
            job.attempts.push(attempt);
            context.commit(&files);
            self.advance_progress(job, attempt_index);
        }

        // Unreachable for max_iterations >= 1, guaranteed by Job validation.
        RunOutcome::Failed(JobError {
            kind: ErrorKind::Internal,
            message: "retry loop exited without a decision".to_owned(),
            partial_result: best.map(|(_, r)| r),
        })
    }

    fn advance_progress(&self, job: &mut Job, attempt_index: u32) {
        let fraction = f64::from(attempt_index) / f64::from(job.max_iterations.max(1));
        let next = (fraction * 95.0).round() as u8;
        job.progress = job.progress.max(next.min(95));
    }

    async fn publish(
        &self,
        job: &Job,
        event_type: JobEventType,
        message: &str,
        attempt_index: u32,
        score: Option<u8>,
        progress: Option<u8>,
    ) {
        let mut event = JobEvent::new(job.id.clone(), event_type, message, Utc::now())
            .with_attempt_index(attempt_index);
        if let Some(score) = score {
            event = event.with_score(score);
        }
        event = event.with_progress(progress.unwrap_or(job.progress));
        self.events.publish(event).await;
    }

    fn build_prompt(job: &Job, context: &GenerationContext, session: &SessionLearning, attempt_index: u32) -> String {
        let mut prompt = format!("Task: {}\nLanguage: {}\n", job.task, job.language);

        if let Some(manifest) = &context.scaffold_manifest {
            for key_file in manifest.key_files() {
                prompt.push_str(&format!("\n--- scaffolded (key) {} ---\n{}\n", key_file.path, key_file.content));
            }
            for listed in manifest.listed_files() {
                prompt.push_str(&format!("\nscaffolded file (listed only): {}\n", listed.path));
            }
        }

        for file in &context.existing_files {
            prompt.push_str(&format!("\n--- existing {} ---\n{}\n", file.path, file.content));
        }

        let hints = dynamic_learner::hints_for_next_attempt(session, attempt_index);
        if !hints.emphasize.is_empty() {
            prompt.push_str(&format!("\nEmphasize: {}\n", hints.emphasize.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")));
        }
        if !hints.avoid.is_empty() {
            prompt.push_str(&format!("\nAvoid: {}\n", hints.avoid.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")));
        }
        if let Some(simplify) = &hints.simplify_hint {
            prompt.push_str(&format!("\n{simplify}\n"));
        }

        // §4.2.d "most recent attempt's unresolved issues".
        if let Some(previous) = job.attempts.last() {
            if let Some(validation) = &previous.validation {
                if !validation.issues.is_empty() {
                    prompt.push_str("\nUnresolved issues from the previous attempt:\n");
                    for issue in &validation.issues {
                        prompt.push_str(&format!("- [{}] {}\n", issue.severity, issue.message));
                    }
                }
            }
        }

        prompt
    }

    fn scaffolded_to_file_change(file: &forge_domain::entities::ScaffoldedFile) -> FileChange {
        FileChange::new(file.path.clone(), file.content.clone(), forge_domain::entities::ChangeType::Add, None)
            .unwrap_or_else(|_| FileChange {
                path: file.path.clone(),
                content: file.content.clone(),
                change_type: forge_domain::entities::ChangeType::Add,
                reason: None,
            })
    }
}

fn to_job_error(err: &Error, partial_result: Option<JobResult>) -> JobError {
    JobError { kind: err.kind(), message: err.to_string(), partial_result }
}
