//! The sync run: one page loop with a nested retry loop.
//!
//! Pages are fetched and committed strictly in increasing order, one at a
//! time. Transient fetch failures are retried with exponential backoff up to
//! a fixed attempt budget; everything else aborts the run at the current
//! page. Prior pages stay committed — a rerun re-scans from page 1 and relies
//! on upsert idempotence instead of checkpoints.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ports::{FetchError, ListingSource, ListingStore, StoreError};
use super::DEFAULT_PAGE_SIZE;
use crate::listing::{ExtractError, ListingRecord};

/// Tunables for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Records per page; a shorter page terminates the scan. Must match the
    /// page size the source actually requests (`DomusConfig::page_size`).
    pub page_size: usize,
    /// Total fetch attempts per page, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub total_processed: usize,
    pub pages_fetched: u32,
}

/// A failed run, pinned to the page that broke it.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed on page {page} after {attempts} attempt(s): {source}")]
    Fetch {
        page: u32,
        attempts: u32,
        source: FetchError,
    },

    #[error("malformed listing on page {page}: {source}")]
    Extract { page: u32, source: ExtractError },

    #[error("database error on page {page}: {source}")]
    Store { page: u32, source: StoreError },
}

/// Drives one full pass over the remote source.
pub struct SyncRunner<S, T> {
    source: S,
    store: T,
    options: SyncOptions,
}

impl<S: ListingSource, T: ListingStore> SyncRunner<S, T> {
    pub fn new(source: S, store: T, options: SyncOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    /// Page through the source until it returns a short (or empty) page,
    /// committing each non-empty page as one transaction.
    ///
    /// An exactly-full page always continues the scan. This assumes the
    /// remote API never short-pages mid-sequence; a partially filled page
    /// that is not actually the last one would end the scan early.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let mut page: u32 = 1;
        let mut total_processed: usize = 0;

        loop {
            let raw = self.fetch_with_retry(page).await?;
            let count = raw.len();

            if count > 0 {
                let records = extract_page(page, &raw)?;
                self.store
                    .upsert_page(&records)
                    .await
                    .map_err(|source| SyncError::Store { page, source })?;

                total_processed += count;
                info!(page, count, total_processed, "page committed");
                page += 1;
            }

            if count < self.options.page_size {
                debug!(page, count, "short page, pagination finished");
                break;
            }
        }

        Ok(SyncReport {
            total_processed,
            pages_fetched: page - 1,
        })
    }

    async fn fetch_with_retry(&self, page: u32) -> Result<Vec<Value>, SyncError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!(page, attempt, "fetching page");

            let err = match self.source.fetch_page(page).await {
                Ok(items) => return Ok(items),
                Err(err) => err,
            };

            if !err.is_transient() || attempt >= self.options.max_attempts {
                return Err(SyncError::Fetch {
                    page,
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = backoff_delay(self.options.base_delay, attempt);
            warn!(
                page,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient fetch failure, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn extract_page(page: u32, raw: &[Value]) -> Result<Vec<ListingRecord>, SyncError> {
    raw.iter()
        .map(ListingRecord::from_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SyncError::Extract { page, source })
}

/// Delay before retrying after `attempt` failed attempts: `base * 2^(attempt-1)`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << (attempt - 1).min(31);
    base.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct FakeSource {
        script: Mutex<VecDeque<Result<Vec<Value>, FetchError>>>,
        calls: AtomicU32,
    }

    impl FakeSource {
        fn new(script: Vec<Result<Vec<Value>, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingSource for &FakeSource {
        async fn fetch_page(&self, _page: u32) -> Result<Vec<Value>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct FakeStore {
        pages: Mutex<Vec<Vec<ListingRecord>>>,
        fail_on_page: Option<usize>,
    }

    impl FakeStore {
        fn failing_on(page: usize) -> Self {
            Self {
                fail_on_page: Some(page),
                ..Self::default()
            }
        }

        fn committed_pages(&self) -> Vec<usize> {
            self.pages.lock().unwrap().iter().map(Vec::len).collect()
        }
    }

    #[async_trait]
    impl ListingStore for &FakeStore {
        async fn upsert_page(&self, records: &[ListingRecord]) -> Result<(), StoreError> {
            let mut pages = self.pages.lock().unwrap();
            if self.fail_on_page == Some(pages.len() + 1) {
                return Err(StoreError::Database("constraint violation".into()));
            }
            pages.push(records.to_vec());
            Ok(())
        }
    }

    fn listings(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "codpro": format!("P-{i}"), "estado": "Disponible" }))
            .collect()
    }

    fn options() -> SyncOptions {
        SyncOptions {
            base_delay: Duration::from_millis(50),
            ..SyncOptions::default()
        }
    }

    #[tokio::test]
    async fn stops_at_first_short_page() {
        let source = FakeSource::new(vec![Ok(listings(50)), Ok(listings(50)), Ok(listings(37))]);
        let store = FakeStore::default();

        let report = SyncRunner::new(&source, &store, options()).run().await.unwrap();

        assert_eq!(report.total_processed, 137);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(source.calls(), 3);
        assert_eq!(store.committed_pages(), vec![50, 50, 37]);
    }

    #[tokio::test]
    async fn empty_first_page_is_a_successful_noop() {
        let source = FakeSource::new(vec![Ok(Vec::new())]);
        let store = FakeStore::default();

        let report = SyncRunner::new(&source, &store, options()).run().await.unwrap();

        assert_eq!(report.total_processed, 0);
        assert_eq!(report.pages_fetched, 0);
        assert!(store.committed_pages().is_empty());
    }

    #[tokio::test]
    async fn single_short_page() {
        let source = FakeSource::new(vec![Ok(listings(37))]);
        let store = FakeStore::default();

        let report = SyncRunner::new(&source, &store, options()).run().await.unwrap();

        assert_eq!(report.total_processed, 37);
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_with_exponential_backoff() {
        let source = FakeSource::new(vec![
            Err(FetchError::Transport("connection reset".into())),
            Err(FetchError::Status { status: 503 }),
            Ok(listings(10)),
        ]);
        let store = FakeStore::default();
        let opts = SyncOptions {
            base_delay: Duration::from_secs(5),
            ..SyncOptions::default()
        };

        let started = tokio::time::Instant::now();
        let report = SyncRunner::new(&source, &store, opts).run().await.unwrap();

        assert_eq!(report.total_processed, 10);
        assert_eq!(source.calls(), 3);
        // Two backoffs: 5s then 10s.
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_abort_naming_the_page() {
        let source = FakeSource::new(vec![
            Ok(listings(50)),
            Err(FetchError::Status { status: 502 }),
            Err(FetchError::Status { status: 502 }),
            Err(FetchError::Status { status: 502 }),
            Err(FetchError::Status { status: 502 }),
            Err(FetchError::Status { status: 502 }),
        ]);
        let store = FakeStore::default();

        let err = SyncRunner::new(&source, &store, options())
            .run()
            .await
            .unwrap_err();

        match err {
            SyncError::Fetch { page, attempts, .. } => {
                assert_eq!(page, 2);
                assert_eq!(attempts, 5);
            }
            other => panic!("expected fetch error, got {other}"),
        }
        // Page 1 stays committed; page 2 consumed every attempt and no more
        // pages were fetched.
        assert_eq!(store.committed_pages(), vec![50]);
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test]
    async fn fatal_fetch_errors_are_not_retried() {
        let source = FakeSource::new(vec![Err(FetchError::Malformed("not json".into()))]);
        let store = FakeStore::default();

        let err = SyncRunner::new(&source, &store, options())
            .run()
            .await
            .unwrap_err();

        match err {
            SyncError::Fetch { page, attempts, .. } => {
                assert_eq!(page, 1);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected fetch error, got {other}"),
        }
        assert_eq!(source.calls(), 1);
        assert!(store.committed_pages().is_empty());
    }

    #[tokio::test]
    async fn store_failure_aborts_but_keeps_prior_pages() {
        let source = FakeSource::new(vec![Ok(listings(50)), Ok(listings(50))]);
        let store = FakeStore::failing_on(2);

        let err = SyncRunner::new(&source, &store, options())
            .run()
            .await
            .unwrap_err();

        match err {
            SyncError::Store { page, .. } => assert_eq!(page, 2),
            other => panic!("expected store error, got {other}"),
        }
        assert_eq!(store.committed_pages(), vec![50]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn missing_code_is_fatal_before_any_write() {
        let source = FakeSource::new(vec![Ok(vec![json!({ "estado": "Disponible" })])]);
        let store = FakeStore::default();

        let err = SyncRunner::new(&source, &store, options())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Extract { page: 1, .. }));
        assert!(store.committed_pages().is_empty());
    }

    #[test]
    fn backoff_schedule_doubles_from_base() {
        let base = Duration::from_secs(5);
        let delays: Vec<u64> = (1..=5)
            .map(|attempt| backoff_delay(base, attempt).as_secs())
            .collect();
        assert_eq!(delays, vec![5, 10, 20, 40, 80]);
    }
}
