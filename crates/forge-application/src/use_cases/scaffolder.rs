//! Project-template scaffold decision and invocation (§4.8).

use std::sync::Arc;

use forge_domain::entities::{CodebaseSummary, ScaffoldManifest, ScaffoldedFile};
use forge_domain::ports::TemplateExecutor;
use tokio_util::sync::CancellationToken;

const MODIFICATION_WORDS: &[&str] = &["add", "modify", "update", "fix", "change"];
const NEW_PROJECT_WORDS: &[&str] = &["new", "complete", "project"];

/// `isModification` (§4.8).
#[must_use]
pub fn is_modification(task: &str) -> bool {
    let lower = task.to_lowercase();
    MODIFICATION_WORDS.iter().any(|w| lower.contains(w))
}

/// `isNewProject` (§4.8).
#[must_use]
pub fn is_new_project(task: &str) -> bool {
    let lower = task.to_lowercase();
    lower.starts_with("create") || NEW_PROJECT_WORDS.iter().any(|w| lower.contains(w))
}

/// `forceScaffold` (§4.8).
#[must_use]
pub fn force_scaffold(task: &str) -> bool {
    let lower = task.to_lowercase();
    lower.starts_with("create") || lower.contains("create new") || lower.contains("create a")
}

/// Whether the Scaffolder should run for this task/workspace (§4.8
/// "Decision", §9 "forceScaffold priority" open question).
#[must_use]
pub fn should_scaffold(task: &str, workspace: &CodebaseSummary) -> bool {
    let new_project = is_new_project(task);
    let modification = is_modification(task);
    let forced = force_scaffold(task);
    let workspace_empty = !workspace.has_source_files;

    // forceScaffold takes priority over the modification heuristic
    // (§9 open question resolution).
    if forced {
        return true;
    }
    new_project && !modification && workspace_empty
}

/// Infer a project type from task phrasing (§4.8).
#[must_use]
pub fn infer_project_type(task: &str) -> &'static str {
    let lower = task.to_lowercase();
    if lower.contains("blazor") {
        "blazor"
    } else if lower.contains("web api") {
        "web-api"
    } else if lower.contains("console") {
        "console"
    } else {
        "generic"
    }
}

/// Files that should be inlined in the generation prompt: entrypoint,
/// manifest, top-level configuration (§4.8 "Key files").
fn is_key_file(path: &str) -> bool {
    const KEY_NAMES: &[&str] = &[
        "main.rs", "main.go", "main.py", "program.cs", "index.ts", "index.js", "app.razor", "cargo.toml",
        "go.mod", "package.json", ".csproj", "pyproject.toml",
    ];
    let lower = path.to_lowercase();
    KEY_NAMES.iter().any(|name| lower.ends_with(name))
}

/// Decides whether to scaffold and, if so, invokes the external
/// `TemplateExecutor`.
pub struct Scaffolder {
    template_executor: Arc<dyn TemplateExecutor>,
}

impl Scaffolder {
    #[must_use]
    pub fn new(template_executor: Arc<dyn TemplateExecutor>) -> Self {
        Self { template_executor }
    }

    /// Run the scaffold decision for `task`/`workspace`; returns `None` if
    /// scaffolding should not run.
    ///
    /// # Errors
    /// Returns an error if the `TemplateExecutor` call fails.
    pub async fn maybe_scaffold(
        &self,
        task: &str,
        workspace_path: &str,
        workspace: &CodebaseSummary,
        cancel_token: CancellationToken,
    ) -> forge_domain::Result<Option<ScaffoldManifest>> {
        if !should_scaffold(task, workspace) {
            return Ok(None);
        }
        let project_type = infer_project_type(task);
        let files: Vec<ScaffoldedFile> = self
            .template_executor
            .scaffold(project_type, workspace_path, cancel_token)
            .await?;
        let key_file_paths = files.iter().map(|f| f.path.clone()).filter(|p| is_key_file(p)).collect();
        Ok(Some(ScaffoldManifest { files, key_file_paths }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(has_source_files: bool) -> CodebaseSummary {
        CodebaseSummary { has_source_files, ..CodebaseSummary::default() }
    }

    #[test]
    fn force_scaffold_overrides_modification_wording() {
        assert!(should_scaffold("create a new service that modifies the order flow", &summary(true)));
    }

    #[test]
    fn plain_new_project_on_non_empty_workspace_does_not_scaffold() {
        assert!(!should_scaffold("build a new widget", &summary(true)));
    }

    #[test]
    fn plain_new_project_on_empty_workspace_scaffolds() {
        assert!(should_scaffold("build a new widget", &summary(false)));
    }

    #[test]
    fn modification_task_never_scaffolds_without_force() {
        assert!(!should_scaffold("fix the login bug", &summary(false)));
    }

    #[test]
    fn infers_blazor_project_type() {
        assert_eq!(infer_project_type("Create a new Blazor chess project"), "blazor");
    }
}
