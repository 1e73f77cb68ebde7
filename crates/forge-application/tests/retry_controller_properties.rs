//! Integration coverage for the retry loop's testable properties and
//! end-to-end scenarios: attempt indexing and score bounds, compile-failure
//! short-circuiting, the accept condition, exhaustion with a partial
//! result, and cancellation mid-flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use forge_application::config::{EscalatorConfig, RetryConfig, ValidationEnsembleConfig};
use forge_application::{Escalator, RetryController, RunOutcome, Scaffolder, ThinkingEnsemble, ValidationEnsemble};
use forge_domain::entities::{CodebaseSummary, FileChange, Issue, Job, JobRequest, ScaffoldedFile, Severity};
use forge_domain::error::Result;
use forge_domain::events::JobEvent;
use forge_domain::ports::{
    EventPublisher, ModelCallOptions, ModelResponse, ModelRunner, TemplateExecutor, Validator, ValidatorOptions,
    ValidatorResponse, WorkspaceInspector,
};
use forge_domain::value_objects::{Context, JobId};
use tokio_util::sync::CancellationToken;

struct NullEventPublisher;

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish(&self, _event: JobEvent) {}
}

struct EmptyWorkspace;

#[async_trait]
impl WorkspaceInspector for EmptyWorkspace {
    async fn summarize(&self, _workspace_path: &str, _cancel_token: CancellationToken) -> Result<CodebaseSummary> {
        Ok(CodebaseSummary::default())
    }
}

struct UnusedTemplateExecutor;

#[async_trait]
impl TemplateExecutor for UnusedTemplateExecutor {
    async fn scaffold(&self, _project_type: &str, _target_dir: &str, _cancel_token: CancellationToken) -> Result<Vec<ScaffoldedFile>> {
        panic!("scaffolder should not be invoked for a non-scaffolding task");
    }
}

/// Always returns one well-formed file block so every attempt has a
/// parseable candidate, regardless of which model name it's called with.
struct EchoModelRunner {
    calls: Arc<AtomicUsize>,
}

impl EchoModelRunner {
    fn new() -> Self {
        Self { calls: Arc::new(AtomicUsize::new(0)) }
    }
}

#[async_trait]
impl ModelRunner for EchoModelRunner {
    async fn invoke(&self, model_name: &str, _prompt: &str, options: ModelCallOptions) -> Result<ModelResponse> {
        // A real yield point so a concurrently-running cancel watcher gets a
        // chance to observe `calls` between invocations instead of racing a
        // tight, never-yielding loop to completion.
        tokio::time::sleep(Duration::from_millis(5)).await;
        if options.cancel_token.is_cancelled() {
            return Err(forge_domain::Error::Cancelled);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = format!("--- FILE: src/counter.rs\n--- TYPE: add\n// by {model_name}\nfn counter() {{}}\n--- END\n");
        Ok(ModelResponse { text, tokens_used: Some(16), duration_ms: 0 })
    }
}

/// A validator whose score is scripted per attempt: every registered
/// clone shares one call counter, and `validators_per_attempt` clones are
/// expected to be called once each per attempt, so `call_index /
/// validators_per_attempt` recovers the 0-based attempt.
struct ScriptedValidator {
    scores: Vec<u8>,
    calls: Arc<AtomicUsize>,
    validators_per_attempt: usize,
    compile_ok: bool,
}

impl ScriptedValidator {
    fn shared(scores: Vec<u8>, validators_per_attempt: usize) -> Arc<Self> {
        Arc::new(Self { scores, calls: Arc::new(AtomicUsize::new(0)), validators_per_attempt, compile_ok: true })
    }
}

#[async_trait]
impl Validator for ScriptedValidator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn validate(&self, _files: &[FileChange], _language: &str, _options: ValidatorOptions) -> Result<ValidatorResponse> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = call_index / self.validators_per_attempt.max(1);
        let score = *self.scores.get(attempt).unwrap_or_else(|| self.scores.last().expect("non-empty script"));
        Ok(ValidatorResponse { score, passed: score >= 8, issues: Vec::new(), compile_ok: self.compile_ok })
    }
}

/// A validator that always reports a failed compile, regardless of score.
struct CompileFailingValidator;

#[async_trait]
impl Validator for CompileFailingValidator {
    fn name(&self) -> &str {
        "compile-failing"
    }

    async fn validate(&self, _files: &[FileChange], _language: &str, _options: ValidatorOptions) -> Result<ValidatorResponse> {
        Ok(ValidatorResponse {
            score: 9,
            passed: false,
            issues: vec![Issue::new(Severity::Critical, "compile_error", "does not compile")],
            compile_ok: false,
        })
    }
}

fn job_with(task: &str, max_iterations: u32, min_score: u8) -> Job {
    let now = Utc::now();
    let req = JobRequest {
        task: task.to_owned(),
        language: Some("rust".to_owned()),
        workspace_path: "/tmp/retry-controller-tests".to_owned(),
        max_iterations: Some(max_iterations),
        min_score: Some(min_score),
        background: None,
    };
    let context = Context::derive(&req.workspace_path).expect("derivable context");
    Job::queued(JobId::new(now), context, &req, now)
}

fn controller(
    model_runner: Arc<dyn ModelRunner>,
    validators: Vec<Arc<dyn Validator>>,
    confidence_threshold: f64,
) -> RetryController {
    let thinking = ThinkingEnsemble::new(Arc::clone(&model_runner), Duration::from_secs(5), Duration::from_secs(10));
    let validation = ValidationEnsemble::new(validators, ValidationEnsembleConfig::default());
    let escalator = Escalator::new(EscalatorConfig::default());
    let scaffolder = Scaffolder::new(Arc::new(UnusedTemplateExecutor));
    RetryController::new(
        model_runner,
        Arc::new(EmptyWorkspace),
        Arc::new(NullEventPublisher),
        thinking,
        validation,
        escalator,
        scaffolder,
        RetryConfig { confidence_threshold, model_call_timeout_ms: 5_000, thinking_strategy_timeout_ms: 10_000, job_timeout_ms: 60_000 },
        vec!["thinker-a".to_owned()],
    )
}

/// Property 3 & 5: attempt indices are 1-based and strictly increasing,
/// scores stay in [0, 10], and a job completes only once an attempt
/// passes, clears `minScore`, and clears `confidenceThreshold`.
#[tokio::test]
async fn scenario_b_retry_with_learning_then_completes() {
    let validator = ScriptedValidator::shared(vec![5, 9], 2);
    let model_runner = Arc::new(EchoModelRunner::new());
    let ctrl = controller(
        model_runner,
        vec![validator.clone() as Arc<dyn Validator>, validator as Arc<dyn Validator>],
        0.7,
    );

    let mut job = job_with("fix the counter so it never goes below zero", 5, 8);
    let outcome = ctrl.run(&mut job, CancellationToken::new()).await;

    assert_eq!(job.attempts.len(), 2);
    for (i, attempt) in job.attempts.iter().enumerate() {
        assert_eq!(attempt.index, i as u32 + 1);
        if let Some(validation) = &attempt.validation {
            assert!(validation.score <= 10);
        }
    }
    match outcome {
        RunOutcome::Completed(result) => {
            assert_eq!(result.accepted_attempt_index, 2);
            assert_eq!(result.score, 9);
        }
        _ => panic!("expected the job to complete on the second attempt"),
    }
}

/// Property 4: any ensemble member reporting a compile failure forces
/// `score = 0` regardless of the other member's vote.
#[tokio::test]
async fn compile_failure_forces_zero_score_and_blocks_completion() {
    let scored = ScriptedValidator::shared(vec![9], 1);
    let model_runner = Arc::new(EchoModelRunner::new());
    let ctrl = controller(
        model_runner,
        vec![Arc::new(CompileFailingValidator), scored as Arc<dyn Validator>],
        0.0,
    );

    let mut job = job_with("fix the counter underflow", 1, 1);
    ctrl.run(&mut job, CancellationToken::new()).await;

    let attempt = job.attempts.first().expect("one attempt recorded");
    let validation = attempt.validation.as_ref().expect("validated");
    assert_eq!(validation.score, 0);
    assert!(!validation.passed);
}

/// Scenario C: exhaustion after `maxIterations` attempts surfaces the
/// highest (tie -> latest) scoring attempt as `error.partialResult`.
#[tokio::test]
async fn scenario_c_exhaustion_keeps_latest_tied_best_as_partial_result() {
    let validator = ScriptedValidator::shared(vec![6, 6, 6], 2);
    let model_runner = Arc::new(EchoModelRunner::new());
    let ctrl = controller(
        model_runner,
        vec![validator.clone() as Arc<dyn Validator>, validator as Arc<dyn Validator>],
        0.0,
    );

    let mut job = job_with("refine the counter implementation", 3, 8);
    let outcome = ctrl.run(&mut job, CancellationToken::new()).await;

    assert_eq!(job.attempts.len(), 3);
    match outcome {
        RunOutcome::Failed(error) => {
            assert_eq!(error.kind, forge_domain::ErrorKind::MaxIterations);
            let partial = error.partial_result.expect("a partial result from the tied-best attempt");
            assert_eq!(partial.accepted_attempt_index, 3);
            assert_eq!(partial.score, 6);
        }
        _ => panic!("expected MaxIterations failure"),
    }
}

/// Scenario D: cancelling mid-flight stops further attempts and surfaces
/// whatever partial result had accumulated so far, never `Completed`.
#[tokio::test]
async fn scenario_d_cancellation_mid_flight_stops_the_loop() {
    let validator = ScriptedValidator::shared(vec![6, 6, 6, 6, 6, 6, 6, 6, 6, 6], 2);
    let model_runner = Arc::new(EchoModelRunner::new());
    let calls = Arc::clone(&model_runner.calls);
    let ctrl = controller(
        model_runner,
        vec![validator.clone() as Arc<dyn Validator>, validator as Arc<dyn Validator>],
        0.0,
    );

    let mut job = job_with("refine the counter implementation", 10, 8);
    let cancel_token = CancellationToken::new();

    // Cancel once the model has been invoked at least twice (thinking +
    // generation for attempt 1), simulating "cancel after attempt 1 is
    // observed in flight".
    let watcher_token = cancel_token.clone();
    tokio::spawn(async move {
        loop {
            if calls.load(Ordering::SeqCst) >= 2 {
                watcher_token.cancel();
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });

    let outcome = ctrl.run(&mut job, cancel_token).await;
    assert!(!matches!(outcome, RunOutcome::Completed(_)));
    if let RunOutcome::Cancelled(_) = outcome {
        // expected terminal state
    } else {
        panic!("expected Cancelled, got a different outcome");
    }
}
