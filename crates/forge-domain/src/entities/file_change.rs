//! A single proposed add/modify/delete of one workspace-relative path
//! (§3 "FileChange").

use serde::{Deserialize, Serialize};

/// The kind of change a [`FileChange`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeType {
    /// A new file.
    Add,
    /// An existing file rewritten in place.
    Modify,
    /// A file removed from the workspace.
    Delete,
}

/// A proposed change to one file within a candidate.
///
/// Invariants (enforced by [`FileChange::normalize`] /
/// [`FileChange::validate`]): `path` is workspace-relative, uses forward
/// slashes, and contains no `..` segments; `changeType = delete` implies
/// `content` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Workspace-relative, forward-slash-normalized path.
    pub path: String,
    /// Full file contents (UTF-8). Empty for deletions.
    pub content: String,
    /// Whether this is an add, modify, or delete.
    pub change_type: ChangeType,
    /// Optional short rationale for this change.
    pub reason: Option<String>,
}

impl FileChange {
    /// Build a `FileChange`, normalizing `path` and validating invariants.
    ///
    /// # Errors
    /// Returns an error message if the path escapes the workspace (`..`
    /// segment) or a `Delete` carries non-empty content.
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        change_type: ChangeType,
        reason: Option<String>,
    ) -> Result<Self, String> {
        let path = normalize_path(&path.into());
        let content = content.into();
        if path.split('/').any(|seg| seg == "..") {
            return Err(format!("path '{path}' escapes the workspace root"));
        }
        if path.is_empty() {
            return Err("path must not be empty".to_owned());
        }
        if matches!(change_type, ChangeType::Delete) && !content.is_empty() {
            return Err("a delete change must carry empty content".to_owned());
        }
        Ok(Self {
            path,
            content,
            change_type,
            reason,
        })
    }
}

fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .trim_start_matches('/')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_backslashes_and_leading_slash() {
        let fc = FileChange::new("/src\\main.rs", "fn main() {}", ChangeType::Add, None).unwrap();
        assert_eq!(fc.path, "src/main.rs");
    }

    #[test]
    fn rejects_parent_traversal() {
        assert!(FileChange::new("../etc/passwd", "x", ChangeType::Add, None).is_err());
    }

    #[test]
    fn rejects_delete_with_content() {
        assert!(FileChange::new("a.rs", "stuff", ChangeType::Delete, None).is_err());
    }

    #[test]
    fn allows_delete_with_empty_content() {
        assert!(FileChange::new("a.rs", "", ChangeType::Delete, None).is_ok());
    }
}
