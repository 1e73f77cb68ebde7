//! HTTP-level integration coverage: create returns distinct ids, cancel
//! is idempotent once a job reaches a terminal state, and the `/mcp`
//! front door gates background-worthy requests into queued jobs while
//! leaving unregistered inline tools to fail cleanly.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use forge_application::config::{EscalatorConfig, RetryConfig, RouterConfig, ValidationEnsembleConfig};
use forge_application::{Escalator, RetryController, Router as TaskRouter, Scaffolder, ThinkingEnsemble, ToolRegistry, ValidationEnsemble};
use forge_domain::entities::JobState;
use forge_domain::ports::{EventPublisher, JobStore, ModelRunner};
use forge_infrastructure::adapters::{FsWorkspaceInspector, HeuristicValidator, LocalTemplateExecutor, SimulatedModelRunner};
use forge_infrastructure::events::BroadcastEventPublisher;
use forge_infrastructure::persistence::SqliteJobStore;
use forge_infrastructure::JobManager;
use forge_server::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::connect("sqlite::memory:").await.unwrap());
    let events = Arc::new(BroadcastEventPublisher::new());
    let model_runner: Arc<dyn ModelRunner> = Arc::new(SimulatedModelRunner::new());
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
        Arc::clone(&events) as Arc<dyn EventPublisher>,
        thinking,
        validation,
        escalator,
        scaffolder,
        RetryConfig { confidence_threshold: 0.0, model_call_timeout_ms: 5_000, thinking_strategy_timeout_ms: 10_000, job_timeout_ms: 60_000 },
        vec!["thinker-a".to_owned()],
    );
    let jobs = JobManager::new(store, events, retry_controller, 2);
    let router = Arc::new(TaskRouter::new(ToolRegistry::new(), Arc::new(jobs.clone()), RouterConfig::default()));
    AppState { jobs, router }
}

fn create_request(workspace_path: &str, task: &str) -> Request<Body> {
    let body = json!({
        "task": task,
        "language": "rust",
        "workspace_path": workspace_path,
        "max_iterations": 3,
        "min_score": 5,
    });
    Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Property 6: creating two jobs from distinct payloads returns two
/// distinct job ids.
#[tokio::test]
async fn create_returns_distinct_ids_for_distinct_payloads() {
    let state = test_state().await;
    let app = forge_server::build_router(state);
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let response_a = app.clone().oneshot(create_request(dir_a.path().to_str().unwrap(), "add widget a")).await.unwrap();
    assert_eq!(response_a.status(), StatusCode::OK);
    let body_a = json_body(response_a).await;

    let response_b = app.oneshot(create_request(dir_b.path().to_str().unwrap(), "add widget b")).await.unwrap();
    assert_eq!(response_b.status(), StatusCode::OK);
    let body_b = json_body(response_b).await;

    let id_a = body_a["job_id"].as_str().unwrap();
    let id_b = body_b["job_id"].as_str().unwrap();
    assert_ne!(id_a, id_b);
}

/// Property 1: cancelling a job already in a terminal state is a no-op,
/// not an error, whether requested once or repeatedly.
#[tokio::test]
async fn cancelling_a_terminal_job_is_idempotent() {
    let state = test_state().await;
    let jobs = state.jobs.clone();
    let app = forge_server::build_router(state);

    let dir = tempfile::tempdir().unwrap();
    let create_response = app.clone().oneshot(create_request(dir.path().to_str().unwrap(), "add a widget")).await.unwrap();
    let created = json_body(create_response).await;
    let job_id = created["job_id"].as_str().unwrap().to_owned();

    let id = forge_domain::value_objects::JobId::parse_external(&job_id).unwrap();
    for _ in 0..50 {
        if jobs.status(&id).await.unwrap().state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(jobs.status(&id).await.unwrap().state, JobState::Completed);

    let cancel_uri = format!("/jobs/{job_id}/cancel");
    let first_cancel = app
        .clone()
        .oneshot(Request::builder().method("POST").uri(&cancel_uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first_cancel.status(), StatusCode::OK);

    let second_cancel = app
        .oneshot(Request::builder().method("POST").uri(&cancel_uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(second_cancel.status(), StatusCode::OK);
}

/// Scenario E: the Router's sync/async gate backgrounds a "search"
/// request as a queued job, while a request naming an unregistered
/// inline tool fails cleanly instead of hanging.
#[tokio::test]
async fn mcp_tools_call_gates_search_to_background_and_fails_unknown_inline_tool() {
    let state = test_state().await;
    let app = forge_server::build_router(state);

    let search_body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "execute_task", "arguments": { "request": "search for authentication code" } },
    });
    let search_request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(search_body.to_string()))
        .unwrap();
    let search_response = app.clone().oneshot(search_request).await.unwrap();
    assert_eq!(search_response.status(), StatusCode::OK);
    let search_result = json_body(search_response).await;
    let outcome = &search_result["result"]["outcomes"][0]["outcome"];
    assert!(outcome.get("Queued").is_some(), "expected a Queued outcome, got {outcome:?}");

    let list_body = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": { "name": "list_jobs", "arguments": { "request": "list running jobs" } },
    });
    let list_request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(list_body.to_string()))
        .unwrap();
    let list_response = app.oneshot(list_request).await.unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let list_result = json_body(list_response).await;
    let outcome = &list_result["result"]["outcomes"][0]["outcome"];
    assert!(outcome.get("Failed").is_some(), "expected a Failed outcome for an unregistered inline tool, got {outcome:?}");
}
