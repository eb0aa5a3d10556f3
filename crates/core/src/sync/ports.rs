//! Ports the sync runner drives, kept as traits so the page loop can be
//! exercised against in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::listing::ListingRecord;

/// Errors from fetching one page of listings.
///
/// The variants carry the retry-eligibility tag explicitly: transport and
/// HTTP-status failures are transient and get backed-off retries, a body the
/// client cannot decode is fatal for the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether the retry loop may attempt this page again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Errors from writing one page of listings.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A paginated source of raw listing records.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the given 1-based page. A short or empty page means the source
    /// is exhausted.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError>;
}

/// Destination for extracted listing records.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Upsert one page atomically: either every record is committed or none.
    async fn upsert_page(&self, records: &[ListingRecord]) -> Result<(), StoreError>;
}
