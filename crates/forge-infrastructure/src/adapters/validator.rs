//! Reference `Validator` adapter: a compiler/linter integration isn't
//! wired into this workspace, so `HeuristicValidator` stands in for one
//! with cheap structural checks (non-empty content, no leftover `TODO`
//! markers, balanced braces), scoring candidates well enough to drive the
//! ensemble and retry loop end to end.

use async_trait::async_trait;
use forge_domain::entities::{FileChange, Issue, Severity};
use forge_domain::error::Result;
use forge_domain::ports::{Validator, ValidatorOptions, ValidatorResponse};

/// Named heuristic validator; multiple instances with different `name`s
/// can be registered in a [`forge_application::use_cases::ValidationEnsemble`]
/// to exercise the weighted-consensus path.
pub struct HeuristicValidator {
    name: String,
}

impl HeuristicValidator {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Validator for HeuristicValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, files: &[FileChange], _language: &str, options: ValidatorOptions) -> Result<ValidatorResponse> {
        if let Some(token) = &options.cancel_token {
            if token.is_cancelled() {
                return Err(forge_domain::Error::Cancelled);
            }
        }

        let mut issues = Vec::new();
        for file in files {
            if file.content.is_empty() && !matches!(file.change_type, forge_domain::entities::ChangeType::Delete) {
                issues.push(
                    Issue::new(Severity::High, "empty_file", format!("'{}' has no content", file.path))
                        .at(file.path.clone(), 1),
                );
            }
            if file.content.contains("TODO") {
                issues.push(
                    Issue::new(Severity::Low, "leftover_todo", format!("'{}' still contains a TODO marker", file.path))
                        .at(file.path.clone(), 1),
                );
            }
            let opens = file.content.matches('{').count();
            let closes = file.content.matches('}').count();
            if opens != closes {
                issues.push(
                    Issue::new(Severity::Critical, "unbalanced_braces", format!("'{}' has unbalanced braces", file.path))
                        .at(file.path.clone(), 1),
                );
            }
        }

        let has_critical = issues.iter().any(|i| i.severity == Severity::Critical);
        let score = if has_critical {
            3
        } else {
            10u8.saturating_sub(u8::try_from(issues.len()).unwrap_or(u8::MAX).min(6))
        };

        Ok(ValidatorResponse { score, passed: !has_critical && score >= 7, issues, compile_ok: !has_critical })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::entities::ChangeType;

    fn file(content: &str) -> FileChange {
        FileChange::new("a.rs", content, ChangeType::Add, None).unwrap()
    }

    #[tokio::test]
    async fn clean_file_scores_full_marks() {
        let validator = HeuristicValidator::new("heuristic-a");
        let response = validator.validate(&[file("fn main() {}")], "rust", ValidatorOptions::default()).await.unwrap();
        assert_eq!(response.score, 10);
        assert!(response.passed);
    }

    #[tokio::test]
    async fn unbalanced_braces_is_critical_and_fails() {
        let validator = HeuristicValidator::new("heuristic-a");
        let response = validator.validate(&[file("fn main() {")], "rust", ValidatorOptions::default()).await.unwrap();
        assert!(!response.passed);
        assert!(response.issues.iter().any(|i| i.severity == Severity::Critical));
    }

    #[tokio::test]
    async fn leftover_todo_lowers_score_but_still_passes() {
        let validator = HeuristicValidator::new("heuristic-a");
        let response = validator.validate(&[file("fn main() { /* TODO */ }")], "rust", ValidatorOptions::default()).await.unwrap();
        assert_eq!(response.score, 9);
        assert!(response.passed);
    }
}
