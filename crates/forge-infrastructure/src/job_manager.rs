//! The composition point for a job's whole lifecycle (SPEC_FULL §4.1a,
//! §4.9): owns every [`Job`] in memory (per `forge-domain`'s "owned
//! exclusively by the infrastructure layer's `JobManager`" contract),
//! persists through [`JobStore`], publishes through
//! [`BroadcastEventPublisher`], and bounds concurrent runs with a
//! `tokio::sync::Semaphore`-gated worker pool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use forge_application::{RetryController, RunOutcome};
use forge_domain::entities::{Job, JobError, JobRequest, JobState};
use forge_domain::error::{Error, ErrorKind, Result};
use forge_domain::events::JobEvent;
use forge_domain::ports::{JobLauncher, JobStore};
use forge_domain::value_objects::{Context, JobId};
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::events::BroadcastEventPublisher;

struct Inner {
    store: Arc<dyn JobStore>,
    events: Arc<BroadcastEventPublisher>,
    retry_controller: RetryController,
    semaphore: Arc<Semaphore>,
    live: DashMap<JobId, Arc<Mutex<Job>>>,
    cancel_tokens: DashMap<JobId, CancellationToken>,
}

/// A cheaply-clonable handle to the job registry; every clone shares the
/// same underlying state.
#[derive(Clone)]
pub struct JobManager(Arc<Inner>);

impl JobManager {
    #[must_use]
    pub fn new(
        store: Arc<dyn JobStore>,
        events: Arc<BroadcastEventPublisher>,
        retry_controller: RetryController,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self(Arc::new(Inner {
            store,
            events,
            retry_controller,
            semaphore: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            live: DashMap::new(),
            cancel_tokens: DashMap::new(),
        }))
    }

    /// Validate and persist `req` as a freshly-`Queued` job, then spawn
    /// its run on the worker pool. Returns immediately with the job's id
    /// and the state it starts in.
    ///
    /// When `req.background` is `false` and no worker slot is free right
    /// now, the job is never created; the request fails outright instead
    /// of waiting behind the full pool (§6 `background=false`).
    ///
    /// # Errors
    /// Returns [`Error::invalid_request`] if `req` fails validation, or
    /// [`Error::worker_pool_exhausted`] per the paragraph above, or an
    /// error if the initial persist fails.
    pub async fn create(&self, req: JobRequest) -> Result<(JobId, JobState)> {
        Job::validate_request(&req).map_err(Error::invalid_request)?;
        let background = req.background.unwrap_or(true);

        let permit = self.0.semaphore.clone().try_acquire_owned().ok();
        if !background && permit.is_none() {
            return Err(Error::worker_pool_exhausted("no worker slot is currently free"));
        }
        let initial_state = if permit.is_some() { JobState::Running } else { JobState::Queued };

        let now = Utc::now();
        let context = Context::derive(&req.workspace_path)?;
        let id = JobId::new(now);
        let job = Job::queued(id.clone(), context, &req, now);

        self.0.store.insert(&job).await?;
        self.0.live.insert(id.clone(), Arc::new(Mutex::new(job.clone())));

        let manager = self.clone();
        tokio::spawn(async move { manager.run(job, permit).await });

        Ok((id, initial_state))
    }

    /// Read the current view of `id`, preferring the live in-memory copy
    /// (authoritative while the job runs) and falling back to the
    /// durable store for jobs from a prior process (§9 restart recovery).
    ///
    /// # Errors
    /// Returns [`Error::not_found`] if no such job is known.
    pub async fn status(&self, id: &JobId) -> Result<Job> {
        if let Some(entry) = self.0.live.get(id) {
            return Ok(entry.lock().await.clone());
        }
        self.0.store.get(id).await
    }

    /// List every retained job, live entries taking priority over their
    /// (possibly stale) persisted counterpart.
    ///
    /// # Errors
    /// Returns an error if the store read fails.
    pub async fn list(&self) -> Result<Vec<Job>> {
        let mut jobs = self.0.store.list().await?;
        for job in &mut jobs {
            if let Some(entry) = self.0.live.get(&job.id) {
                *job = entry.lock().await.clone();
            }
        }
        Ok(jobs)
    }

    /// Request cancellation of a running job. A no-op if the job already
    /// reached a terminal state.
    ///
    /// # Errors
    /// Returns [`Error::not_found`] if no such job is known.
    pub async fn cancel(&self, id: &JobId) -> Result<()> {
        if let Some(token) = self.0.cancel_tokens.get(id) {
            token.cancel();
            return Ok(());
        }
        // Not currently running: either already terminal, or unknown.
        let job = self.status(id).await?;
        if job.state.is_terminal() {
            return Ok(());
        }
        Err(Error::not_found(format!("job '{id}'")))
    }

    /// Subscribe to a job's progress events.
    #[must_use]
    pub fn subscribe(&self, id: &JobId) -> tokio::sync::broadcast::Receiver<JobEvent> {
        self.0.events.subscribe(id)
    }

    /// On startup, any job persisted as `Queued`/`Running` belonged to a
    /// process that never reached a terminal state for it; mark each
    /// `Failed` with [`ErrorKind::Interrupted`] rather than silently
    /// resuming work whose in-memory context is gone (§3 "Service
    /// restarted during a Running job").
    ///
    /// # Errors
    /// Returns an error if the store read or any write fails.
    pub async fn recover(&self) -> Result<()> {
        for mut job in self.0.store.list().await? {
            if job.state.is_terminal() {
                continue;
            }
            job.state = JobState::Failed;
            job.completed_at = Some(Utc::now());
            job.error = Some(JobError {
                kind: ErrorKind::Interrupted,
                message: "service restarted while the job was in progress".to_owned(),
                partial_result: None,
            });
            self.0.store.update(&job).await?;
        }
        Ok(())
    }

    async fn run(&self, mut job: Job, permit: Option<tokio::sync::OwnedSemaphorePermit>) {
        let cancel_token = CancellationToken::new();
        self.0.cancel_tokens.insert(job.id.clone(), cancel_token.clone());

        // `create` already claimed a slot for us when one was free; otherwise
        // wait our turn like any other queued job.
        let _permit = match permit {
            Some(permit) => permit,
            None => match self.0.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    self.0.cancel_tokens.remove(&job.id);
                    self.0.live.remove(&job.id);
                    return;
                }
            },
        };

        job.state = JobState::Running;
        job.started_at = Some(Utc::now());
        if let Some(entry) = self.0.live.get(&job.id) {
            *entry.lock().await = job.clone();
        }
        let _ = self.0.store.update(&job).await;

        let outcome = self.0.retry_controller.run(&mut job, cancel_token).await;

        match outcome {
            RunOutcome::Completed(result) => {
                job.state = JobState::Completed;
                job.result = Some(result);
            }
            RunOutcome::Failed(error) => {
                job.state = JobState::Failed;
                job.error = Some(error);
            }
            RunOutcome::TimedOut(error) => {
                job.state = JobState::TimedOut;
                job.error = Some(error);
            }
            RunOutcome::Cancelled(partial) => {
                job.state = JobState::Cancelled;
                job.error = Some(JobError { kind: ErrorKind::Cancelled, message: "cancelled".to_owned(), partial_result: partial });
            }
        }
        // §3: "Once terminal, progress = 100" — even on failure/cancellation.
        job.progress = 100;
        job.completed_at = Some(Utc::now());

        let _ = self.0.store.update(&job).await;
        self.0.cancel_tokens.remove(&job.id);
        self.0.live.remove(&job.id);
        self.0.events.forget(&job.id);
    }
}

#[async_trait]
impl JobLauncher for JobManager {
    async fn launch(&self, req: JobRequest) -> Result<JobId> {
        self.create(req).await.map(|(id, _state)| id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use forge_application::config::{EscalatorConfig, RetryConfig, ValidationEnsembleConfig};
    use forge_application::{Escalator, Scaffolder, ThinkingEnsemble, ValidationEnsemble};
    use forge_domain::entities::JobState;

    use crate::adapters::{FsWorkspaceInspector, HeuristicValidator, LocalTemplateExecutor, SimulatedModelRunner};
    use crate::persistence::SqliteJobStore;

    use super::*;

    async fn manager_with() -> (JobManager, tempfile::TempDir) {
        let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::connect("sqlite::memory:").await.unwrap());
        let events = Arc::new(BroadcastEventPublisher::new());
        let model_runner: Arc<dyn forge_domain::ports::ModelRunner> = Arc::new(SimulatedModelRunner::new());
        let thinking = ThinkingEnsemble::new(Arc::clone(&model_runner), Duration::from_secs(5), Duration::from_secs(10));
        let validation = ValidationEnsemble::new(
            vec![Arc::new(HeuristicValidator::new("heuristic-a"))],
            ValidationEnsembleConfig::default(),
        );
        let escalator = Escalator::new(EscalatorConfig::default());
        let scaffolder = Scaffolder::new(Arc::new(LocalTemplateExecutor::new()));
        let retry_controller = RetryController::new(
            model_runner,
            Arc::new(FsWorkspaceInspector::new()),
            Arc::clone(&events) as Arc<dyn forge_domain::ports::EventPublisher>,
            thinking,
            validation,
            escalator,
            scaffolder,
            RetryConfig {
                confidence_threshold: 0.0,
                model_call_timeout_ms: 5_000,
                thinking_strategy_timeout_ms: 10_000,
                job_timeout_ms: 60_000,
            },
            vec!["thinker-a".to_owned()],
        );
        let manager = JobManager::new(store, events, retry_controller, 2);
        let dir = tempfile::tempdir().unwrap();
        (manager, dir)
    }

    #[tokio::test]
    async fn a_launched_job_runs_to_a_terminal_state() {
        let (manager, dir) = manager_with().await;
        let req = JobRequest {
            task: "add a widget".to_owned(),
            language: Some("rust".to_owned()),
            workspace_path: dir.path().to_str().unwrap().to_owned(),
            max_iterations: Some(3),
            min_score: Some(5),
            background: None,
        };
        let (id, initial_state) = manager.create(req).await.unwrap();
        assert_eq!(initial_state, JobState::Running);

        let mut job = manager.status(&id).await.unwrap();
        for _ in 0..50 {
            if job.state.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            job = manager.status(&id).await.unwrap();
        }

        assert!(job.state.is_terminal());
        assert_eq!(job.state, JobState::Completed);
    }

    #[tokio::test]
    async fn non_background_create_fails_fast_when_pool_is_full() {
        let (manager, dir) = manager_with().await;
        // `manager_with` configures a pool of 2 slots; hold both so `create`
        // sees none free.
        let _held = (
            manager.0.semaphore.clone().try_acquire_owned().unwrap(),
            manager.0.semaphore.clone().try_acquire_owned().unwrap(),
        );

        let req = JobRequest {
            task: "add a widget".to_owned(),
            language: None,
            workspace_path: dir.path().to_str().unwrap().to_owned(),
            max_iterations: Some(1),
            min_score: Some(5),
            background: Some(false),
        };
        let err = manager.create(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkerPoolExhausted);
    }

    #[tokio::test]
    async fn cancelling_an_unknown_job_is_an_error() {
        let (manager, _dir) = manager_with().await;
        let bogus = JobId::new(Utc::now());
        assert!(manager.cancel(&bogus).await.is_err());
    }

    #[tokio::test]
    async fn recover_marks_unterminated_jobs_interrupted() {
        let (manager, dir) = manager_with().await;
        let req = JobRequest {
            task: "add a widget".to_owned(),
            language: None,
            workspace_path: dir.path().to_str().unwrap().to_owned(),
            max_iterations: Some(1),
            min_score: Some(5),
            background: None,
        };
        let context = Context::derive(&req.workspace_path).unwrap();
        let now = Utc::now();
        let orphaned = Job::queued(JobId::new(now), context, &req, now);
        manager.0.store.insert(&orphaned).await.unwrap();

        manager.recover().await.unwrap();

        let recovered = manager.0.store.get(&orphaned.id).await.unwrap();
        assert_eq!(recovered.state, JobState::Failed);
        assert_eq!(recovered.error.unwrap().kind, ErrorKind::Interrupted);
    }
}
