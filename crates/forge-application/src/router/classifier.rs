//! Request classification (§4.7 step 1).

use serde::{Deserialize, Serialize};

/// `{intent, entities[], estimatedSteps}` (§4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The recognized intent, e.g. `"generate"`, `"search"`, `"status"`.
    pub intent: String,
    /// Entities extracted from the request text.
    pub entities: Vec<String>,
    /// Rough step count estimate used by the planner.
    pub estimated_steps: u32,
}

/// Deterministic keyword classifier (§4.7 "Failure semantics" — the
/// fallback when a model-based classifier is unavailable or fails).
#[must_use]
pub fn classify_by_keyword(request: &str) -> Classification {
    let lower = request.to_lowercase();

    let intent = if lower.starts_with("create") || lower.contains("generate") {
        "generate"
    } else if lower.contains("search") || lower.contains("find") {
        "search"
    } else if lower.contains("status") {
        "status"
    } else if lower.starts_with("list") || lower.contains("list ") {
        "list"
    } else if lower.contains("cancel") {
        "cancel"
    } else {
        "unknown"
    };

    let entities: Vec<String> = lower
        .split_whitespace()
        .filter(|w| w.len() > 4 && !["create", "search", "status", "cancel"].contains(w))
        .map(str::to_owned)
        .collect();

    let estimated_steps = match intent {
        "generate" => 3,
        "search" => 1,
        _ => 1,
    };

    Classification { intent: intent.to_owned(), entities, estimated_steps }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_generation_requests() {
        assert_eq!(classify_by_keyword("create a user service with CRUD").intent, "generate");
    }

    #[test]
    fn classifies_status_over_list_when_status_present() {
        assert_eq!(classify_by_keyword("status of running jobs").intent, "status");
    }

    #[test]
    fn classifies_plain_list_requests() {
        assert_eq!(classify_by_keyword("list running jobs").intent, "list");
    }

    #[test]
    fn classifies_search_requests() {
        assert_eq!(classify_by_keyword("search for authentication code").intent, "search");
    }
}
