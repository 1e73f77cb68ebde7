//! Router output: an ordered, dependency-aware list of tool calls
//! (§3 "WorkflowPlan", §4.7).

use serde::{Deserialize, Serialize};

/// Predicted duration class for a single [`PlanStep`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DurationClass {
    /// Under 2 seconds.
    Fast,
    /// 2-10 seconds.
    Medium,
    /// Over 10 seconds.
    Slow,
}

/// One tool invocation within a [`WorkflowPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Step identifier, unique within its plan.
    pub id: String,
    /// The tool to invoke (matches the MCP tool catalog).
    pub tool: String,
    /// Arguments to pass to the tool.
    pub args: serde_json::Value,
    /// Ids of steps that must complete before this one starts.
    pub depends_on: Vec<String>,
    /// Predicted duration class, used by the sync/async gate.
    pub expected_duration_class: DurationClass,
}

/// An ordered, dependency-aware list of tool calls produced by the
/// Router's planning phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    /// Steps in declaration order (not necessarily execution order).
    pub steps: Vec<PlanStep>,
}

/// The outcome recorded for one step after dispatch (§4.7 "Aggregate").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The step ran synchronously and returned a result inline.
    Completed(serde_json::Value),
    /// The step was enqueued as a background job.
    Queued {
        /// The background job's id.
        job_id: String,
    },
    /// The step failed.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
    /// The step was skipped because a dependency failed.
    Skipped {
        /// Human-readable reason, naming the failed dependency.
        reason: String,
    },
}

impl WorkflowPlan {
    /// Topologically order the plan's steps respecting `depends_on`,
    /// using each step's declaration order as a tiebreak.
    ///
    /// # Errors
    /// Returns an error if the dependency graph contains a cycle or an
    /// unknown step id.
    pub fn topological_order(&self) -> Result<Vec<&PlanStep>, String> {
        use petgraph::algo::toposort;
        use petgraph::graph::{DiGraph, NodeIndex};
        use std::collections::HashMap;

        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for step in &self.steps {
            let idx = graph.add_node(step.id.as_str());
            nodes.insert(step.id.as_str(), idx);
        }
        for step in &self.steps {
            let to = nodes[step.id.as_str()];
            for dep in &step.depends_on {
                let from = *nodes
                    .get(dep.as_str())
                    .ok_or_else(|| format!("unknown dependency '{dep}' for step '{}'", step.id))?;
                graph.add_edge(from, to, ());
            }
        }
        let order = toposort(&graph, None).map_err(|_| "workflow plan has a dependency cycle".to_owned())?;
        let by_id: HashMap<&str, &PlanStep> =
            self.steps.iter().map(|s| (s.id.as_str(), s)).collect();
        Ok(order.into_iter().map(|idx| by_id[graph[idx]]).collect())
    }
}
