use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use tokio_util::sync::CancellationToken;
use super::matcher::QueryMatcher;
use crate::api::{Collection, HadithSource, Record};
use crate::error::SearchError;

/// Default number of records per range request
pub const DEFAULT_BATCH_SIZE: u32 = 50;

/// Default upper bound of record numbers scanned per book
pub const DEFAULT_MAX_PER_COLLECTION: u32 = 200;

/// Default pause between two range requests
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub batch_size: u32,
    pub max_per_collection: u32,
    pub batch_delay: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_per_collection: DEFAULT_MAX_PER_COLLECTION,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl SearchOptions {
    /// Inclusive windows `[start, end]` covering `1..=min(available, max_per_collection)`
    pub fn windows(&self, collection: &Collection) -> Vec<(u32, u32)> {
        let cap = collection.available_count.min(self.max_per_collection);
        let step = self.batch_size.max(1);

        let mut windows = Vec::new();
        let mut start = 1u32;
        while start <= cap {
            let end = start.saturating_add(step - 1).min(cap);
            windows.push((start, end));
            match end.checked_add(1) {
                Some(next) => start = next,
                None => break,
            }
        }
        windows
    }
}

/// Scans one book window by window and keeps the records matching a query.
#[derive(Debug, Clone)]
pub struct RangeBatchFetcher {
    source: Arc<dyn HadithSource>,
    options: SearchOptions,
}

impl RangeBatchFetcher {
    pub fn new(source: Arc<dyn HadithSource>, options: SearchOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Matching records of `collection`, in ascending window order.
    ///
    /// A failed window is logged and skipped. The only error returned is
    /// [`SearchError::Cancelled`], raised when `cancel` is set at a window boundary.
    pub async fn fetch_matches(
        &self,
        collection: &Collection,
        matcher: &QueryMatcher,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, SearchError> {
        let windows = self.options.windows(collection);
        let mut matches = Vec::new();
        let mut failed_windows = 0usize;

        debug!(
            "Scanning {} ({}) in {} windows",
            collection.name,
            collection.id,
            windows.len()
        );

        for (index, &(start, end)) in windows.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!("Scan of {} cancelled before window {}-{}", collection.id, start, end);
                return Err(SearchError::Cancelled);
            }

            match self.source.fetch_range(collection, start, end).await {
                Ok(records) => {
                    let before = matches.len();
                    matches.extend(records.into_iter().filter(|r| matcher.matches_record(r)));
                    debug!(
                        "Window {}-{} of {}: {} matches",
                        start,
                        end,
                        collection.id,
                        matches.len() - before
                    );
                }
                Err(SearchError::MalformedResponse(reason)) => {
                    failed_windows += 1;
                    warn!(
                        "Unrecognized response for batch {}-{} from {}: {}",
                        start, end, collection.name, reason
                    );
                }
                Err(e) => {
                    failed_windows += 1;
                    warn!(
                        "Failed to fetch batch {}-{} from {}: {}",
                        start, end, collection.name, e
                    );
                }
            }

            let has_next = index + 1 < windows.len();
            if has_next && !cancel.is_cancelled() && !self.options.batch_delay.is_zero() {
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        info!(
            "Scanned {}: {} matches ({} of {} windows failed)",
            collection.name,
            matches.len(),
            failed_windows,
            windows.len()
        );

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(batch_size: u32, max_per_collection: u32) -> SearchOptions {
        SearchOptions {
            batch_size,
            max_per_collection,
            batch_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_windows_capped_by_max() {
        let bukhari = Collection::new("bukhari", "HR. Bukhari", 7563);
        assert_eq!(
            SearchOptions::default().windows(&bukhari),
            vec![(1, 50), (51, 100), (101, 150), (151, 200)]
        );
    }

    #[test]
    fn test_windows_capped_by_available() {
        let small = Collection::new("small", "Small", 120);
        assert_eq!(
            options(50, 200).windows(&small),
            vec![(1, 50), (51, 100), (101, 120)]
        );
    }

    #[test]
    fn test_windows_empty_collection() {
        let empty = Collection::new("empty", "Empty", 0);
        assert!(options(50, 200).windows(&empty).is_empty());
        let bukhari = Collection::new("bukhari", "HR. Bukhari", 7563);
        assert!(options(50, 0).windows(&bukhari).is_empty());
    }

    #[test]
    fn test_windows_single_record_batches() {
        let c = Collection::new("c", "C", 3);
        assert_eq!(options(1, 200).windows(&c), vec![(1, 1), (2, 2), (3, 3)]);
    }
}
