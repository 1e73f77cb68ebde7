//! Infrastructure layer for the Generation Orchestration Engine:
//! concrete adapters for every `forge-domain` port, configuration
//! loading, logging setup, durable persistence, and the `JobManager`
//! that ties them together (SPEC_FULL §4.1a, §4.9).

pub mod adapters;
pub mod config;
pub mod events;
pub mod job_manager;
pub mod logging;
pub mod persistence;
pub mod retention;

pub use config::{AppConfig, ConfigLoader, DatabaseConfig, ServerConfig};
pub use events::BroadcastEventPublisher;
pub use job_manager::JobManager;
