//! Job identifiers.
//!
//! §6 "Job id format": `job_<yyyyMMddHHmmss>_<32-hex-nonce>`, sortable
//! by creation time. Grounded on the teacher's `define_id!` macro pattern
//! (a newtype around an opaque value with `Display`/`Serialize`), but
//! specialized here because the external representation is a formatted
//! string rather than a bare UUID.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Globally unique, time-sortable job identifier.
///
/// `Display`/`Serialize` always produce the canonical external string
/// (`job_<timestamp>_<nonce>`); equality and hashing operate on that same
/// string, so two `JobId`s are equal iff their external representations
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Mint a new id timestamped at `created_at`.
    #[must_use]
    pub fn new(created_at: chrono::DateTime<chrono::Utc>) -> Self {
        let mut nonce_bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = hex::encode(nonce_bytes);
        Self(format!(
            "job_{}_{nonce}",
            created_at.format("%Y%m%d%H%M%S")
        ))
    }

    /// Parse a previously-minted external id string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] if `raw` does not match the
    /// `job_<14-digit-timestamp>_<32-hex-nonce>` shape.
    pub fn parse_external(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix("job_")
            .ok_or_else(|| Error::invalid_request(format!("malformed job id: {raw}")))?;
        let (timestamp, nonce) = rest
            .split_once('_')
            .ok_or_else(|| Error::invalid_request(format!("malformed job id: {raw}")))?;
        let valid = timestamp.len() == 14
            && timestamp.bytes().all(|b| b.is_ascii_digit())
            && nonce.len() == 32
            && nonce.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(Error::invalid_request(format!("malformed job id: {raw}")));
        }
        Ok(Self(raw.to_owned()))
    }

    /// The canonical external string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_external_string() {
        let id = JobId::new(chrono::Utc::now());
        let parsed = JobId::parse_external(id.as_str()).expect("valid id");
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(JobId::parse_external("not-a-job-id").is_err());
        assert!(JobId::parse_external("job_123_abc").is_err());
    }

    #[test]
    fn sorts_by_creation_time() {
        let earlier = chrono::Utc::now() - chrono::Duration::seconds(5);
        let later = chrono::Utc::now();
        let a = JobId::new(earlier);
        let b = JobId::new(later);
        assert!(a.as_str() < b.as_str());
    }
}
