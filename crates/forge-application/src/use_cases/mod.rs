//! Use cases orchestrating the domain entities and ports (§4).

pub mod candidate_parser;
pub mod dynamic_learner;
pub mod escalator;
pub mod retry_controller;
pub mod scaffolder;
pub mod thinking_ensemble;
pub mod validation_ensemble;

pub use escalator::Escalator;
pub use retry_controller::{RetryController, RunOutcome};
pub use scaffolder::Scaffolder;
pub use thinking_ensemble::ThinkingEnsemble;
pub use validation_ensemble::ValidationEnsemble;
