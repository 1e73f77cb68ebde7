//! Durable storage adapters (SPEC_FULL §4.1a).

mod sqlite_job_store;

pub use sqlite_job_store::SqliteJobStore;
