//! Reference adapters for every external collaborator port
//! `forge-domain` defines (§6): deterministic, in-process
//! implementations standing in for a model backend, a compiler/linter,
//! a semantic memory service, a workspace-summary service, and a
//! project-scaffold service.

mod memory_store;
mod model_runner;
mod template_executor;
mod validator;
mod workspace_inspector;

pub use memory_store::InMemoryMemoryStore;
pub use model_runner::SimulatedModelRunner;
pub use template_executor::LocalTemplateExecutor;
pub use validator::HeuristicValidator;
pub use workspace_inspector::FsWorkspaceInspector;
