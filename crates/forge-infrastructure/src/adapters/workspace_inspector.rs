//! Reference `WorkspaceInspector` adapter: walks the workspace on disk
//! with `ignore` (so `.gitignore`d build output doesn't skew the
//! summary) and classifies files by extension.

use async_trait::async_trait;
use forge_domain::entities::CodebaseSummary;
use forge_domain::error::{Error, Result};
use forge_domain::ports::WorkspaceInspector;
use ignore::WalkBuilder;
use tokio_util::sync::CancellationToken;

/// Maps a handful of common extensions to a human-readable language name.
/// Unknown extensions are skipped rather than guessed at.
fn language_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "rs" => Some("rust"),
        "ts" | "tsx" => Some("typescript"),
        "js" | "jsx" => Some("javascript"),
        "py" => Some("python"),
        "go" => Some("go"),
        "java" => Some("java"),
        "cs" => Some("csharp"),
        "rb" => Some("ruby"),
        "c" | "h" => Some("c"),
        "cpp" | "cc" | "hpp" => Some("cpp"),
        _ => None,
    }
}

/// Walks `workspace_path` one level deep for top-level directories and
/// recursively (respecting `.gitignore`) for file counts and languages.
pub struct FsWorkspaceInspector;

impl FsWorkspaceInspector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsWorkspaceInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceInspector for FsWorkspaceInspector {
    async fn summarize(&self, workspace_path: &str, cancel_token: CancellationToken) -> Result<CodebaseSummary> {
        if cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let root = workspace_path.to_owned();
        tokio::task::spawn_blocking(move || summarize_blocking(&root, &cancel_token))
            .await
            .map_err(|err| Error::io_with_source("workspace summary task panicked", err))?
    }
}

fn summarize_blocking(root: &str, cancel_token: &CancellationToken) -> Result<CodebaseSummary> {
    let root_path = std::path::Path::new(root);
    if !root_path.exists() {
        return Err(Error::io(format!("workspace path '{root}' does not exist")));
    }

    let mut top_directories = Vec::new();
    if let Ok(entries) = std::fs::read_dir(root_path) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    top_directories.push(name.to_owned());
                }
            }
        }
    }
    top_directories.sort();

    let mut file_count = 0u64;
    let mut languages = std::collections::BTreeSet::new();

    for entry in WalkBuilder::new(root_path).hidden(false).build() {
        if cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        file_count += 1;
        if let Some(extension) = entry.path().extension().and_then(|e| e.to_str()) {
            if let Some(language) = language_for_extension(extension) {
                languages.insert(language.to_owned());
            }
        }
    }

    Ok(CodebaseSummary {
        file_count,
        top_directories,
        has_source_files: !languages.is_empty(),
        detected_languages: languages.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detects_rust_sources_and_top_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"").unwrap();

        let inspector = FsWorkspaceInspector::new();
        let summary = inspector
            .summarize(dir.path().to_str().unwrap(), CancellationToken::new())
            .await
            .unwrap();

        assert!(summary.file_count >= 2);
        assert!(summary.detected_languages.contains(&"rust".to_owned()));
        assert!(summary.top_directories.contains(&"src".to_owned()));
        assert!(summary.has_source_files);
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let inspector = FsWorkspaceInspector::new();
        let result = inspector.summarize("/nonexistent/workspace/path", CancellationToken::new()).await;
        assert!(result.is_err());
    }
}
