//! Reference `ModelRunner` adapter: no outbound model backend is wired
//! into this workspace, so `SimulatedModelRunner` stands in for one,
//! deterministically synthesizing a well-formed candidate from the
//! prompt so the retry loop and ensembles have something real to drive
//! against end to end.

use std::time::Instant;

use async_trait::async_trait;
use forge_domain::error::Result;
use forge_domain::ports::{ModelCallOptions, ModelResponse, ModelRunner};

/// Synthesizes a single-file candidate whose content echoes the prompt's
/// task line, varying slightly by `model_name` so repeated attempts in
/// the same job produce distinguishable (if equally fake) output.
pub struct SimulatedModelRunner;

impl SimulatedModelRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedModelRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelRunner for SimulatedModelRunner {
    async fn invoke(&self, model_name: &str, prompt: &str, options: ModelCallOptions) -> Result<ModelResponse> {
        let start = Instant::now();
        if options.cancel_token.is_cancelled() {
            return Err(forge_domain::Error::Cancelled);
        }

        let task_line = prompt.lines().find(|l| l.starts_with("Task:")).unwrap_or("Task: (unspecified)");

        let text = format!(
            "--- FILE: src/generated.rs\n--- TYPE: modify\n// generated by {model_name}\n// {task_line}\nfn generated() {{}}\n--- END\n"
        );

        Ok(ModelResponse {
            tokens_used: Some(text.len() as u64 / 4),
            duration_ms: start.elapsed().as_millis() as u64,
            text,
        })
    }
}
