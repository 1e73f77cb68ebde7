//! Job lifecycle endpoints: create, inspect, list, cancel (§4.1).

use axum::extract::{Path, State};
use axum::Json;
use forge_domain::entities::{Job, JobRequest, JobState};
use forge_domain::value_objects::JobId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: String,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /jobs`
///
/// Honors `req.background` (§6): when `false` and no worker slot is free,
/// the job is never created and this returns `WorkerPoolExhausted`
/// instead of queueing behind the full pool.
///
/// # Errors
/// Returns [`ApiError`] if the request fails validation, or if
/// `background=false` finds no free worker slot.
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<JobRequest>,
) -> Result<Json<CreateJobResponse>, ApiError> {
    let (job_id, job_state) = state.jobs.create(req).await?;
    let message = (job_state == JobState::Queued).then(|| "queued behind the worker pool".to_owned());
    Ok(Json(CreateJobResponse { job_id: job_id.to_string(), state: job_state, message }))
}

/// `GET /jobs/{id}`
///
/// # Errors
/// Returns [`ApiError`] if `id` is malformed or unknown.
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Job>, ApiError> {
    let job_id = JobId::parse_external(&id)?;
    let job = state.jobs.status(&job_id).await?;
    Ok(Json(job))
}

/// `GET /jobs`
///
/// # Errors
/// Returns [`ApiError`] if the listing read fails.
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, ApiError> {
    let jobs = state.jobs.list().await?;
    Ok(Json(jobs))
}

/// `POST /jobs/{id}/cancel`
///
/// # Errors
/// Returns [`ApiError`] if `id` is malformed or unknown.
pub async fn cancel_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<()>, ApiError> {
    let job_id = JobId::parse_external(&id)?;
    state.jobs.cancel(&job_id).await?;
    Ok(Json(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router as AxumRouter;
    use forge_application::config::RouterConfig;
    use forge_application::{Router as TaskRouter, ToolRegistry};
    use forge_infrastructure::events::BroadcastEventPublisher;
    use forge_infrastructure::persistence::SqliteJobStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let store: Arc<dyn forge_domain::ports::JobStore> =
            Arc::new(SqliteJobStore::connect("sqlite::memory:").await.unwrap());
        let events = Arc::new(BroadcastEventPublisher::new());
        let model_runner: Arc<dyn forge_domain::ports::ModelRunner> =
            Arc::new(forge_infrastructure::adapters::SimulatedModelRunner::new());
        let thinking = forge_application::ThinkingEnsemble::new(
            Arc::clone(&model_runner),
            std::time::Duration::from_secs(5),
            std::time::Duration::from_secs(10),
        );
        let validation = forge_application::ValidationEnsemble::new(
            vec![Arc::new(forge_infrastructure::adapters::HeuristicValidator::new("a"))],
            forge_application::config::ValidationEnsembleConfig::default(),
        );
        let escalator = forge_application::Escalator::new(forge_application::config::EscalatorConfig::default());
        let scaffolder =
            forge_application::Scaffolder::new(Arc::new(forge_infrastructure::adapters::LocalTemplateExecutor::new()));
        let retry_controller = forge_application::RetryController::new(
            model_runner,
            Arc::new(forge_infrastructure::adapters::FsWorkspaceInspector::new()),
            Arc::clone(&events) as Arc<dyn forge_domain::ports::EventPublisher>,
            thinking,
            validation,
            escalator,
            scaffolder,
            forge_application::config::RetryConfig::default(),
            vec!["thinker-a".to_owned()],
        );
        let jobs = forge_infrastructure::JobManager::new(store, events, retry_controller, 2);
        let router = Arc::new(TaskRouter::new(ToolRegistry::new(), Arc::new(jobs.clone()), RouterConfig::default()));
        AppState { jobs, router }
    }

    fn app(state: AppState) -> AxumRouter {
        AxumRouter::new()
            .route("/jobs", post(create_job).get(list_jobs))
            .route("/jobs/{id}", get(get_job))
            .route("/jobs/{id}/cancel", post(cancel_job))
            .with_state(state)
    }

    #[tokio::test]
    async fn create_then_fetch_job_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state().await;
        let app = app(state);

        let body = serde_json::json!({
            "task": "add a widget",
            "language": "rust",
            "workspace_path": dir.path().to_str().unwrap(),
            "max_iterations": 1,
            "min_score": 5,
        });
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/jobs")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: CreateJobResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(matches!(created.state, JobState::Queued | JobState::Running));

        let get_request = axum::http::Request::builder()
            .uri(format!("/jobs/{}", created.job_id))
            .body(axum::body::Body::empty())
            .unwrap();
        let get_response = app.oneshot(get_request).await.unwrap();
        assert_eq!(get_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_job_id_is_not_found() {
        let state = test_state().await;
        let app = app(state);
        let request = axum::http::Request::builder()
            .uri("/jobs/not-a-real-id")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
