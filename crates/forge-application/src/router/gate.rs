//! Sync/async dispatch gate (§4.7 step 3).

use forge_domain::entities::DurationClass;

/// Keywords, matched against the tool name and the request text, that mark
/// an operation as inherently slow (§4.7 "Slow-operation predicates":
/// indexing, workspace-wide analysis, listing across services, code
/// generation).
const SLOW_KEYWORDS: &[&str] = &["index", "workspace-wide", "workspace wide", "across services", "generat", "search"];

/// `shouldRunInBackground` (§4.7 step 3).
///
/// A bare `"status"` or a plain `"list …"` request is explicitly carved
/// out as not slow, even though it may otherwise resemble a slow keyword
/// (spec "(A request containing \"status\" or \"list …\" by itself is NOT
/// slow.)").
#[must_use]
pub fn should_run_in_background(tool: &str, request_text: &str, expected_duration_class: DurationClass) -> bool {
    let lower_text = request_text.to_lowercase();
    if lower_text.trim() == "status" || lower_text.starts_with("list") {
        return false;
    }

    let lower_tool = tool.to_lowercase();
    let matches_slow_predicate =
        SLOW_KEYWORDS.iter().any(|kw| lower_tool.contains(kw) || lower_text.contains(kw));

    matches_slow_predicate || expected_duration_class == DurationClass::Slow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_status_and_list_requests_stay_synchronous() {
        assert!(!should_run_in_background("list_jobs", "list running jobs", DurationClass::Fast));
        assert!(!should_run_in_background("get_status", "status", DurationClass::Fast));
    }

    #[test]
    fn search_and_indexing_requests_run_in_background() {
        assert!(should_run_in_background("execute_task", "search for authentication code", DurationClass::Medium));
        assert!(should_run_in_background("execute_task", "reindex the repo", DurationClass::Fast));
    }

    #[test]
    fn slow_duration_class_forces_background_regardless_of_tool_name() {
        assert!(should_run_in_background("custom_tool", "do a thing", DurationClass::Slow));
    }
}
