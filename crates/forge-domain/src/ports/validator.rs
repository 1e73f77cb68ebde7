//! Port to the external static/compile validation collaborator (§6,
//! §4.4 "compilation check").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::entities::{FileChange, Issue};
use crate::error::Result;

/// Validator tuning passed to [`Validator::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidatorOptions {
    /// Rule set names to apply; `None` runs the validator's defaults.
    pub rules: Option<Vec<String>>,
    /// Cancellation signal for this call.
    pub cancel_token: Option<CancellationToken>,
}

/// One validator model's raw result, prior to ensemble merging.
#[derive(Debug, Clone)]
pub struct ValidatorResponse {
    /// Raw score, 0-10.
    pub score: u8,
    /// Whether this validator alone considers the candidate acceptable.
    pub passed: bool,
    /// Issues this validator reported.
    pub issues: Vec<Issue>,
    /// Whether an execution-based compile/build step succeeded, when the
    /// target language supports one (§4.4 "compilation check").
    pub compile_ok: bool,
}

/// Runs compile/static checks against a set of file changes (§6
/// "Validator.validate").
#[async_trait]
pub trait Validator: Send + Sync {
    /// This validator's name, used as the weighting/identity key in the
    /// ensemble's `per_model` results.
    fn name(&self) -> &str;

    /// Validate `files` for `language`.
    ///
    /// # Errors
    /// Returns an error if the validator itself is unreachable; a failing
    /// candidate is reported through `ValidatorResponse`, not an `Err`.
    async fn validate(&self, files: &[FileChange], language: &str, options: ValidatorOptions)
    -> Result<ValidatorResponse>;
}
