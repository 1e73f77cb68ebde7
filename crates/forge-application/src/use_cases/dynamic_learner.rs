//! Per-job adaptive learning coordination (§4.6). The classification
//! rules themselves live on the domain entity
//! [`forge_domain::entities::SessionLearning`]; this use case wires the
//! per-attempt inputs (detected patterns, validator issues) into it.

use forge_domain::entities::{Issue, LearningHints, Pattern, SessionLearning};

/// Observe one attempt's outcome against `session`, updating its pattern
/// statistics in place (§4.6 "On each attempt").
pub fn observe_attempt(session: &mut SessionLearning, detected_patterns: &[Pattern], issues: &[Issue]) {
    let issue_texts: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();
    for pattern in detected_patterns {
        session.observe(pattern, &issue_texts);
    }
}

/// Derive the next attempt's prompt hints (§4.6 "Outputs for the next
/// attempt's prompt").
#[must_use]
pub fn hints_for_next_attempt(session: &SessionLearning, next_attempt_index: u32) -> LearningHints {
    session.hints(next_attempt_index)
}
