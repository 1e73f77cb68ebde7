//! Error handling types.
//!
//! Mirrors the error taxonomy of §7: each [`ErrorKind`] is surfaced
//! verbatim in `error.kind` on a job's terminal state, and every fallible
//! domain/application operation returns [`Result`].

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse-grained classification of an [`Error`], surfaced to callers as
/// `error.kind` on job views (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad inputs; recovered by the caller only, never retried.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// Retry budget exhausted.
    MaxIterations,
    /// User-initiated cancellation.
    Cancelled,
    /// Wall-clock timeout.
    TimedOut,
    /// All models in the ladder failed within an attempt.
    ModelUnavailable,
    /// Validator infrastructure failure; retried, escalates if persistent.
    ValidatorUnavailable,
    /// Generation output could not be parsed into `FileChange[]`.
    ParserError,
    /// Service restarted during a Running job.
    Interrupted,
    /// No worker slot was free for a non-backgrounded request.
    WorkerPoolExhausted,
    /// Catastrophic internal error; carries a correlation id.
    Internal,
}

/// Main error type for the Generation Orchestration Engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed validation at a public boundary.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of what was invalid.
        message: String,
    },

    /// A requested resource (job, attempt) does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// The job's retry budget was exhausted without an accepted candidate.
    #[error("max iterations exhausted after {iterations} attempts")]
    MaxIterations {
        /// Number of attempts run before giving up.
        iterations: u32,
    },

    /// The job was cancelled by the caller.
    #[error("cancelled")]
    Cancelled,

    /// The job exceeded its configured wall-clock budget.
    #[error("timed out after {elapsed_ms}ms")]
    TimedOut {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// Every model in the escalation ladder failed for this attempt.
    #[error("no model available: {message}")]
    ModelUnavailable {
        /// Description of the exhausted ladder / underlying failures.
        message: String,
    },

    /// Validator collaborator failed and no fallback succeeded.
    #[error("validator unavailable: {message}")]
    ValidatorUnavailable {
        /// Description of the validator failure.
        message: String,
    },

    /// Generation output could not be parsed into file changes.
    #[error("failed to parse generation output: {message}")]
    ParserError {
        /// Description of the parse failure.
        message: String,
    },

    /// The service restarted while the job was `Running`.
    #[error("interrupted by restart")]
    Interrupted,

    /// A `background=false` request found no free worker slot.
    #[error("worker pool exhausted: {message}")]
    WorkerPoolExhausted {
        /// Description of the exhausted pool.
        message: String,
    },

    /// A catastrophic, unexpected internal error.
    #[error("internal error ({correlation_id}): {message}")]
    Internal {
        /// Free-text description.
        message: String,
        /// Correlation id for cross-referencing logs.
        correlation_id: String,
    },

    /// I/O operation error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistence layer error (job store writes/reads).
    #[error("persistence error: {message}")]
    Persistence {
        /// Description of the persistence failure.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create an `InvalidRequest` error.
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a `NotFound` error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a `ModelUnavailable` error.
    pub fn model_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
        }
    }

    /// Create a `ValidatorUnavailable` error.
    pub fn validator_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ValidatorUnavailable {
            message: message.into(),
        }
    }

    /// Create a `ParserError`.
    pub fn parser<S: Into<String>>(message: S) -> Self {
        Self::ParserError {
            message: message.into(),
        }
    }

    /// Create a `WorkerPoolExhausted` error.
    pub fn worker_pool_exhausted<S: Into<String>>(message: S) -> Self {
        Self::WorkerPoolExhausted {
            message: message.into(),
        }
    }

    /// Create an `Internal` error with a random correlation id.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create an I/O error.
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with a source.
    pub fn io_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `Configuration` error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Persistence` error.
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Persistence` error with a source.
    pub fn persistence_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Classify this error into the taxonomy of §7.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MaxIterations { .. } => ErrorKind::MaxIterations,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            Self::ValidatorUnavailable { .. } => ErrorKind::ValidatorUnavailable,
            Self::ParserError { .. } => ErrorKind::ParserError,
            Self::Interrupted => ErrorKind::Interrupted,
            Self::WorkerPoolExhausted { .. } => ErrorKind::WorkerPoolExhausted,
            Self::Internal { .. }
            | Self::Io { .. }
            | Self::Json { .. }
            | Self::Configuration { .. }
            | Self::Persistence { .. } => ErrorKind::Internal,
        }
    }
}
