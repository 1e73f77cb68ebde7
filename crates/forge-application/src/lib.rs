//! Application layer for the Generation Orchestration Engine.
//!
//! Implements the use cases — `RetryController`, `Escalator`,
//! `ThinkingEnsemble`, `ValidationEnsemble`, `DynamicLearner`,
//! `Scaffolder`, `Router` — against `forge-domain`'s ports only. Nothing
//! here depends on a concrete model backend, database, or HTTP framework.

pub mod config;
pub mod router;
pub mod use_cases;

pub use router::{RouteResult, Router, RoutedTool, ToolRegistry};
pub use use_cases::{Escalator, RetryController, RunOutcome, Scaffolder, ThinkingEnsemble, ValidationEnsemble};
