//! Error taxonomy for a sync run
//!
//! Every variant here is fatal to the run. A missing release (HTTP 404 on the
//! latest-release lookup) is a normal outcome and never shows up as an error.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote service could not be reached or the response could not be read
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 403 with no remaining quota
    #[error("rate limit exhausted, you have to wait {wait_minutes} minutes")]
    RateLimitExhausted {
        wait_minutes: i64,
        reset_at: Option<DateTime<Utc>>,
    },

    /// A response or state file body did not have the expected shape
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// The state file could not be read or written
    #[error("state file {path} is not accessible: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Decode {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::StoreIo {
            path: path.into(),
            source,
        }
    }

    /// Whether the run stopped because the API quota ran out
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SyncError::RateLimitExhausted { .. })
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
