//! Everything the prompt builder folds into a generation call (§3
//! "GenerationContext").

use serde::{Deserialize, Serialize};

use super::file_change::FileChange;

/// Shallow summary of a workspace, produced by the external
/// `WorkspaceInspector` collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebaseSummary {
    /// Total number of files under the workspace root.
    pub file_count: u64,
    /// The workspace's top-level directory names.
    pub top_directories: Vec<String>,
    /// Languages detected among the workspace's source files.
    pub detected_languages: Vec<String>,
    /// Whether the workspace contains any pre-existing source files.
    pub has_source_files: bool,
}

/// One file produced by the `TemplateExecutor` scaffold step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldedFile {
    /// Workspace-relative path.
    pub path: String,
    /// Full file contents.
    pub content: String,
}

/// The scaffold result folded into the first generation prompt (§4.8).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldManifest {
    /// Every file the scaffold produced (paths only are listed in the
    /// prompt unless the path is also in `key_file_paths`).
    pub files: Vec<ScaffoldedFile>,
    /// Paths of "key" files (entrypoint, manifest, top-level config)
    /// whose full content is inlined in the generation prompt.
    pub key_file_paths: Vec<String>,
}

impl ScaffoldManifest {
    /// Whether any files were scaffolded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Key files, with full content, for inlining into a prompt.
    pub fn key_files(&self) -> impl Iterator<Item = &ScaffoldedFile> {
        self.files
            .iter()
            .filter(|f| self.key_file_paths.contains(&f.path))
    }

    /// Non-key files, to be listed by path only.
    pub fn listed_files(&self) -> impl Iterator<Item = &ScaffoldedFile> {
        self.files
            .iter()
            .filter(|f| !self.key_file_paths.contains(&f.path))
    }
}

/// The accumulated context a single generation call is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Shallow workspace summary.
    pub codebase_summary: CodebaseSummary,
    /// Files produced or touched by prior attempts in this job, carried
    /// forward so the next attempt modifies rather than regenerates them.
    pub existing_files: Vec<FileChange>,
    /// The scaffold result, if scaffolding ran for this job.
    pub scaffold_manifest: Option<ScaffoldManifest>,
}

impl GenerationContext {
    /// Merge `candidate` files onto a copy of `existing_files`, later
    /// paths replacing earlier ones (§4.2.f "Materialize candidate").
    #[must_use]
    pub fn merged_with(&self, candidate: &[FileChange]) -> Vec<FileChange> {
        let mut merged = self.existing_files.clone();
        for change in candidate {
            if let Some(slot) = merged.iter_mut().find(|f| f.path == change.path) {
                *slot = change.clone();
            } else {
                merged.push(change.clone());
            }
        }
        merged
    }

    /// Commit `candidate` into `existing_files` in place (§4.2.i
    /// "commit candidate into existingFiles").
    pub fn commit(&mut self, candidate: &[FileChange]) {
        self.existing_files = self.merged_with(candidate);
    }
}
