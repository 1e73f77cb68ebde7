//! Shared state threaded through every route handler.

use std::sync::Arc;

use forge_application::Router as TaskRouter;
use forge_infrastructure::JobManager;

/// Everything a handler needs: the job registry and the Router front
/// door (§4.1, §4.7).
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobManager,
    pub router: Arc<TaskRouter>,
}
