//! The front door: classify, plan, gate, dispatch, aggregate (§4.7).

use std::sync::Arc;
use std::time::Duration;

use forge_domain::entities::{JobRequest, StepOutcome, WorkflowPlan};
use forge_domain::ports::JobLauncher;

use crate::config::RouterConfig;

use super::classifier::{classify_by_keyword, Classification};
use super::gate::should_run_in_background;
use super::planner::plan_for;

/// A tool the Router knows how to dispatch, registered at startup (§9
/// "Dynamic plugin discovery of tools is replaced by an explicit
/// registry").
#[async_trait::async_trait]
pub trait RoutedTool: Send + Sync {
    /// The tool's name as it appears in `tools/call`.
    fn name(&self) -> &str;

    /// Execute the tool synchronously (only called for fast/medium steps).
    ///
    /// # Errors
    /// Returns an error if the tool invocation fails.
    async fn call(&self, args: serde_json::Value) -> forge_domain::Result<serde_json::Value>;
}

/// The explicit tool registry (§9).
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn RoutedTool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn RoutedTool>) {
        self.tools.push(tool);
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn RoutedTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Names of every registered tool, in registration order (§4.7
    /// "explicit registry", surfaced to `tools/list`).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

/// Aggregated result keyed by plan-step id, in original plan order
/// (§4.7 step 5 "Aggregate").
pub struct RouteResult {
    pub plan: WorkflowPlan,
    pub outcomes: Vec<(String, StepOutcome)>,
}

pub struct Router {
    registry: ToolRegistry,
    job_launcher: Arc<dyn JobLauncher>,
    config: RouterConfig,
}

impl Router {
    #[must_use]
    pub fn new(registry: ToolRegistry, job_launcher: Arc<dyn JobLauncher>, config: RouterConfig) -> Self {
        Self { registry, job_launcher, config }
    }

    /// Names of every tool registered with this Router, for `tools/list`.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Classify, plan, gate, dispatch and aggregate one `tools/call`
    /// invocation (§4.7 algorithm).
    pub async fn execute_task(&self, tool: &str, request_text: &str, args: serde_json::Value) -> RouteResult {
        let classification = self.classify(request_text);
        let plan = plan_for(tool, args, &classification);
        self.dispatch(plan, request_text).await
    }

    fn classify(&self, request_text: &str) -> Classification {
        // §4.7 step 1 names a small model as the primary classifier
        // with a deterministic keyword fallback on failure; this
        // reference implementation runs the fallback directly, since
        // model invocation is out of the Router's contract (§6 only
        // specifies `ModelRunner` for the generation/thinking path).
        classify_by_keyword(request_text)
    }

    async fn dispatch(&self, plan: WorkflowPlan, request_text: &str) -> RouteResult {
        let ordered = plan.topological_order().unwrap_or_else(|_| plan.steps.iter().collect());
        let ordered_ids: Vec<String> = ordered.iter().map(|s| s.id.clone()).collect();

        let mut outcomes: Vec<(String, StepOutcome)> = Vec::new();
        let mut failed_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

        for step_id in &ordered_ids {
            let step = plan.steps.iter().find(|s| &s.id == step_id).expect("step exists in plan");

            if step.depends_on.iter().any(|dep| failed_ids.contains(dep)) {
                outcomes.push((
                    step.id.clone(),
                    StepOutcome::Skipped { reason: format!("dependency failed: {}", step.depends_on.join(",")) },
                ));
                failed_ids.insert(step.id.clone());
                continue;
            }

            let background = should_run_in_background(&step.tool, request_text, step.expected_duration_class);

            let outcome = if background {
                self.dispatch_background(step.tool.as_str(), request_text).await
            } else {
                self.dispatch_inline(step.tool.as_str(), step.args.clone()).await
            };

            if let StepOutcome::Failed { .. } = &outcome {
                failed_ids.insert(step.id.clone());
            }
            outcomes.push((step.id.clone(), outcome));
        }

        RouteResult { plan, outcomes }
    }

    async fn dispatch_background(&self, tool: &str, request_text: &str) -> StepOutcome {
        let req = JobRequest {
            task: request_text.to_owned(),
            language: None,
            workspace_path: ".".to_owned(),
            max_iterations: None,
            min_score: None,
            background: None,
        };
        let _ = tool;
        match self.job_launcher.launch(req).await {
            Ok(job_id) => StepOutcome::Queued { job_id: job_id.to_string() },
            Err(err) => StepOutcome::Failed { reason: err.to_string() },
        }
    }

    async fn dispatch_inline(&self, tool: &str, args: serde_json::Value) -> StepOutcome {
        let Some(routed) = self.registry.find(tool) else {
            return StepOutcome::Failed { reason: format!("unknown tool '{tool}'") };
        };
        let timeout = Duration::from_millis(self.config.step_timeout_ms);
        match tokio::time::timeout(timeout, routed.call(args)).await {
            Ok(Ok(value)) => StepOutcome::Completed(value),
            Ok(Err(err)) => StepOutcome::Failed { reason: err.to_string() },
            Err(_) => StepOutcome::Failed { reason: format!("tool '{tool}' timed out after {}ms", self.config.step_timeout_ms) },
        }
    }
}
