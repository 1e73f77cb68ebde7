//! The composition root: wires every concrete adapter into the
//! application layer's use cases, building a ready-to-serve
//! [`forge_server::AppState`] from a loaded [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use forge_application::config::ValidationEnsembleConfig;
use forge_application::{Escalator, RetryController, Router, Scaffolder, ThinkingEnsemble, ToolRegistry, ValidationEnsemble};
use forge_domain::ports::{
    EventPublisher, JobLauncher, JobStore, MemoryStore, ModelRunner, TemplateExecutor, Validator, WorkspaceInspector,
};
use forge_infrastructure::adapters::{
    FsWorkspaceInspector, HeuristicValidator, InMemoryMemoryStore, LocalTemplateExecutor, SimulatedModelRunner,
};
use forge_infrastructure::persistence::SqliteJobStore;
use forge_infrastructure::{AppConfig, BroadcastEventPublisher, JobManager};

use crate::tools::{MemorySearchTool, SummarizeWorkspaceTool};

/// Everything the binary needs once wiring is complete: the shared
/// [`forge_server::AppState`] and the retention-sweep handle to spawn.
pub struct Composition {
    pub state: forge_server::AppState,
    pub store: Arc<dyn JobStore>,
}

/// Build the full dependency graph from `config`.
///
/// # Errors
/// Returns an error if the durable job store cannot be opened.
pub async fn compose(config: &AppConfig) -> anyhow::Result<Composition> {
    let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::connect(&config.database.url).await?);
    let events = Arc::new(BroadcastEventPublisher::new());

    let model_runner: Arc<dyn ModelRunner> = Arc::new(SimulatedModelRunner::new());
    let workspace_inspector: Arc<dyn WorkspaceInspector> = Arc::new(FsWorkspaceInspector::new());
    let memory_store: Arc<dyn MemoryStore> = Arc::new(InMemoryMemoryStore::new());
    let template_executor: Arc<dyn TemplateExecutor> = Arc::new(LocalTemplateExecutor::new());

    let validators: Vec<Arc<dyn Validator>> = ["syntax", "style", "security", "test-coverage", "docs"]
        .into_iter()
        .map(|name| Arc::new(HeuristicValidator::new(name)) as Arc<dyn Validator>)
        .collect();

    let thinking = ThinkingEnsemble::new(
        Arc::clone(&model_runner),
        Duration::from_millis(config.retry.model_call_timeout_ms),
        Duration::from_millis(config.retry.thinking_strategy_timeout_ms),
    );
    let validation = ValidationEnsemble::new(validators, ValidationEnsembleConfig { default_weights: config.validation.default_weights.clone() });
    let escalator = Escalator::new(config.escalator.clone());
    let scaffolder = Scaffolder::new(template_executor);

    let thinking_models: Vec<String> = config.escalator.tiers.iter().map(|tier| tier.model.clone()).collect();

    let retry_controller = RetryController::new(
        Arc::clone(&model_runner),
        Arc::clone(&workspace_inspector),
        Arc::clone(&events) as Arc<dyn EventPublisher>,
        thinking,
        validation,
        escalator,
        scaffolder,
        config.retry.clone(),
        thinking_models,
    );

    let job_manager = JobManager::new(Arc::clone(&store), Arc::clone(&events), retry_controller, config.server.max_concurrent_jobs);
    job_manager.recover().await?;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(MemorySearchTool::new(memory_store)));
    registry.register(Arc::new(SummarizeWorkspaceTool::new(workspace_inspector)));

    let job_launcher: Arc<dyn JobLauncher> = Arc::new(job_manager.clone());
    let router = Arc::new(Router::new(registry, job_launcher, config.router.clone()));

    let state = forge_server::AppState { jobs: job_manager, router };
    Ok(Composition { state, store })
}
