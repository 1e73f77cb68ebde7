//! Workflow planning (§4.7 step 2).

use forge_domain::entities::{DurationClass, PlanStep, WorkflowPlan};

use super::classifier::Classification;

/// Predicted duration class for a classified intent, used by the sync/async
/// gate (§3 "fast <2s, medium 2-10s, slow >10s").
#[must_use]
pub fn duration_class_for_intent(intent: &str) -> DurationClass {
    match intent {
        "generate" => DurationClass::Slow,
        "search" => DurationClass::Medium,
        _ => DurationClass::Fast,
    }
}

/// Build a single-step [`WorkflowPlan`] for `classification` against
/// `tool`. Multi-step plans (e.g. search-then-summarize) compose
/// several of these with `depends_on` wiring; this is the minimal unit
/// the planner emits per intent.
#[must_use]
pub fn plan_for(tool: &str, args: serde_json::Value, classification: &Classification) -> WorkflowPlan {
    WorkflowPlan {
        steps: vec![PlanStep {
            id: "step-1".to_owned(),
            tool: tool.to_owned(),
            args,
            depends_on: Vec::new(),
            expected_duration_class: duration_class_for_intent(&classification.intent),
        }],
    }
}
