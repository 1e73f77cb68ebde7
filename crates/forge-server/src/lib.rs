//! HTTP and JSON-RPC transport layer for the Generation Orchestration
//! Engine: job lifecycle REST endpoints, an SSE progress stream, and a
//! hand-rolled JSON-RPC 2.0 surface for the Router front door (§4.1,
//! §4.7, §6).

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router as AxumRouter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the full `axum` application, wiring every route onto `state`.
#[must_use]
pub fn build_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/jobs", post(routes::orchestrator::create_job).get(routes::orchestrator::list_jobs))
        .route("/jobs/{id}", get(routes::orchestrator::get_job))
        .route("/jobs/{id}/cancel", post(routes::orchestrator::cancel_job))
        .route("/jobs/{id}/events", get(routes::events::job_events))
        .route("/mcp", post(routes::mcp::handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
