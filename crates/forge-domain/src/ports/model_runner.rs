//! Port to the external LLM invocation collaborator (§6
//! "Collaborator interfaces consumed by the core").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Per-call tuning passed to [`ModelRunner::invoke`].
#[derive(Debug, Clone)]
pub struct ModelCallOptions {
    /// Maximum tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Model context window, in tokens, for prompt-truncation decisions.
    pub context_window: u32,
    /// Cancellation signal for this call.
    pub cancel_token: CancellationToken,
}

/// The result of one model invocation.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// The model's raw text output.
    pub text: String,
    /// Tokens consumed, if reported.
    pub tokens_used: Option<u64>,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
}

/// Invokes a named model with a prompt (§6).
///
/// Implementations fail with [`crate::error::Error::model_unavailable`],
/// rate limiting, cancellation, or timeout, all folded by the caller into
/// the same error kind — the ensemble boundary treats them uniformly.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Invoke `model_name` with `prompt`.
    ///
    /// # Errors
    /// Returns an error if the model is unavailable, rate-limited,
    /// cancelled, or times out.
    async fn invoke(&self, model_name: &str, prompt: &str, options: ModelCallOptions) -> Result<ModelResponse>;
}
