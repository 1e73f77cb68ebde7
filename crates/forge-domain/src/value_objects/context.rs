//! Workspace-scoped memory partition key.
//!
//! §6 "Context derivation": `context = lowercase(basename(workspacePath))`
//! with all non-alphanumerics removed. Empty contexts are rejected.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A lowercase, alphanumeric-only token partitioning all external memory
/// lookups (§3 "context", §5 "the external `MemoryStore` is
/// partitioned by `context`").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(String);

impl Context {
    /// Derive a context from a workspace path.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] if the derived token is empty
    /// (e.g. the path has no alphanumeric basename).
    pub fn derive(workspace_path: &str) -> Result<Self> {
        let basename = Path::new(workspace_path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let token: String = basename
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if token.is_empty() {
            return Err(Error::invalid_request(format!(
                "workspacePath '{workspace_path}' yields an empty context"
            )));
        }
        Ok(Self(token))
    }

    /// The raw token, suitable for use as a storage partition key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
