//! Durable `JobStore` adapter backed by `sqlx`/SQLite. Jobs are stored
//! whole, serialized as JSON, keyed by id: the retry loop already owns
//! the canonical in-memory representation, so this store's job is
//! durability and restart recovery, not query flexibility (SPEC_FULL
//! §4.1a).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forge_domain::entities::Job;
use forge_domain::error::{Error, Result};
use forge_domain::ports::JobStore;
use forge_domain::value_objects::JobId;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

/// Opens (creating if needed) the jobs table on a `SqlitePool`.
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Connect to `database_url` (e.g. `sqlite://forge.db?mode=rwc`) and
    /// ensure the schema exists.
    ///
    /// # Errors
    /// Returns an error if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(|err| Error::persistence_with_source("connecting to job store", err))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                completed_at TEXT,
                body TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|err| Error::persistence_with_source("creating jobs table", err))?;

        Ok(Self { pool })
    }

    fn serialize(job: &Job) -> Result<String> {
        serde_json::to_string(job).map_err(Error::from)
    }

    fn deserialize(body: &str) -> Result<Job> {
        serde_json::from_str(body).map_err(Error::from)
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: &Job) -> Result<()> {
        let body = Self::serialize(job)?;
        sqlx::query("INSERT INTO jobs (id, completed_at, body) VALUES (?1, ?2, ?3)")
            .bind(job.id.as_str())
            .bind(job.completed_at.map(|t| t.to_rfc3339()))
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::persistence_with_source(format!("inserting job '{}'", job.id), err))?;
        Ok(())
    }

    async fn update(&self, job: &Job) -> Result<()> {
        let body = Self::serialize(job)?;
        sqlx::query("UPDATE jobs SET completed_at = ?2, body = ?3 WHERE id = ?1")
            .bind(job.id.as_str())
            .bind(job.completed_at.map(|t| t.to_rfc3339()))
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::persistence_with_source(format!("updating job '{}'", job.id), err))?;
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Job> {
        let row = sqlx::query("SELECT body FROM jobs WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| Error::persistence_with_source(format!("reading job '{id}'"), err))?
            .ok_or_else(|| Error::not_found(format!("job '{id}'")))?;
        let body: String = row.try_get("body").map_err(|err| Error::persistence_with_source("reading job body", err))?;
        Self::deserialize(&body)
    }

    async fn list(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query("SELECT body FROM jobs ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| Error::persistence_with_source("listing jobs", err))?;
        rows.iter()
            .map(|row| {
                let body: String = row.try_get("body").map_err(|err| Error::persistence_with_source("reading job body", err))?;
                Self::deserialize(&body)
            })
            .collect()
    }

    async fn delete_completed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE completed_at IS NOT NULL AND completed_at <= ?1")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::persistence_with_source("sweeping retained jobs", err))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::entities::JobRequest;
    use forge_domain::value_objects::Context;

    async fn store() -> SqliteJobStore {
        SqliteJobStore::connect("sqlite::memory:").await.unwrap()
    }

    fn job(id_seed: DateTime<Utc>) -> Job {
        let req = JobRequest {
            task: "do something".to_owned(),
            language: None,
            workspace_path: "/workspaces/acme".to_owned(),
            max_iterations: None,
            min_score: None,
            background: None,
        };
        let context = Context::derive(&req.workspace_path).unwrap();
        Job::queued(JobId::new(id_seed), context, &req, id_seed)
    }

    #[tokio::test]
    async fn inserted_job_round_trips() {
        let store = store().await;
        let job = job(Utc::now());
        store.insert(&job).await.unwrap();
        let fetched = store.get(&job.id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.task, job.task);
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let store = store().await;
        let missing = JobId::new(Utc::now());
        assert!(store.get(&missing).await.is_err());
    }

    #[tokio::test]
    async fn sweep_deletes_only_completed_before_cutoff() {
        let store = store().await;
        let mut old_job = job(Utc::now() - chrono::Duration::hours(2));
        old_job.completed_at = Some(Utc::now() - chrono::Duration::hours(1));
        store.insert(&old_job).await.unwrap();

        let fresh_job = job(Utc::now());
        store.insert(&fresh_job).await.unwrap();

        let deleted = store.delete_completed_before(Utc::now()).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get(&old_job.id).await.is_err());
        assert!(store.get(&fresh_job.id).await.is_ok());
    }
}
