//! Configuration loading: a TOML file merged with `FORGE__`-prefixed
//! environment overrides via `figment`, the same layering the ambient
//! stack uses elsewhere in this workspace for file+env config.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use forge_application::config::{EscalatorConfig, RetryConfig, RouterConfig, ValidationEnsembleConfig};
use forge_domain::error::{Error, Result};

/// HTTP/JSON-RPC server binding and job-concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Maximum number of jobs run concurrently (§4.9 bounded worker pool).
    pub max_concurrent_jobs: usize,
    /// Retention window for completed jobs before the sweep deletes them
    /// (SPEC_FULL §4.1b).
    pub job_retention_hours: u64,
    /// How often the retention sweep runs (SPEC_FULL §4.1b).
    pub retention_sweep_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            max_concurrent_jobs: 4,
            job_retention_hours: 24,
            retention_sweep_interval_ms: 15 * 60 * 1000,
        }
    }
}

/// Database backend selection for the durable job store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlx` connection string, e.g. `sqlite://forge.db`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://forge.db?mode=rwc".to_owned() }
    }
}

/// The whole application's configuration tree. Every section has a
/// `Default`, so a missing config file and missing env vars still
/// produce a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP/JSON-RPC server settings.
    pub server: ServerConfig,
    /// Durable job store settings.
    pub database: DatabaseConfig,
    /// Retry loop tuning (§4.2).
    pub retry: RetryConfig,
    /// Escalator ladder (§4.5).
    pub escalator: EscalatorConfig,
    /// Validation ensemble weights (§4.4).
    pub validation: ValidationEnsembleConfig,
    /// Router step gating (§4.7).
    pub router: RouterConfig,
}

/// Loads [`AppConfig`] from an optional TOML file plus environment
/// overrides, following the resolution order: defaults < `forge.toml`
/// (or an explicit path) < `FORGE__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// # Errors
    /// Returns an error if the config file exists but fails to parse, or
    /// if an environment override cannot be coerced into its field type.
    pub fn load(&self) -> Result<AppConfig> {
        let toml_path = self.config_path.clone().unwrap_or_else(|| PathBuf::from("forge.toml"));

        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if toml_path.exists() {
            figment = figment.merge(Toml::file(&toml_path));
        }
        figment = figment.merge(Env::prefixed("FORGE__").split("__"));

        figment.extract().map_err(|err| Error::configuration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_with_no_file_present() {
        let config = ConfigLoader::new().with_config_path("/nonexistent/forge.toml").load().unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.retry.job_timeout_ms, 60 * 60 * 1000);
    }

    #[test]
    #[serial_test::serial]
    #[allow(unsafe_code)]
    fn environment_override_wins_over_defaults() {
        // SAFETY: test runs serialized; no other thread reads this var concurrently.
        unsafe {
            std::env::set_var("FORGE__SERVER__MAX_CONCURRENT_JOBS", "16");
        }
        let config = ConfigLoader::new().with_config_path("/nonexistent/forge.toml").load().unwrap();
        assert_eq!(config.server.max_concurrent_jobs, 16);
        // SAFETY: test runs serialized.
        unsafe {
            std::env::remove_var("FORGE__SERVER__MAX_CONCURRENT_JOBS");
        }
    }
}
