use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fetcher::{RangeBatchFetcher, SearchOptions};
use super::matcher::QueryMatcher;
use super::pager::{DEFAULT_ITEMS_PER_PAGE, PageView, ResultPager};
use crate::api::{Collection, HadithSource, Record};
use crate::error::SearchError;

/// Observable state of the current search.
///
/// `total_results == results.len()` whenever `error` is unset and `loading` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub results: Vec<Record>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_results: usize,
    /// Distinguishes "never searched" from "searched, nothing found"
    pub search_performed: bool,
}

impl SearchState {
    fn finished(results: Vec<Record>) -> Self {
        Self {
            total_results: results.len(),
            results,
            loading: false,
            error: None,
            search_performed: true,
        }
    }

    fn failed(error: &SearchError) -> Self {
        Self {
            results: Vec::new(),
            loading: false,
            error: Some(error.to_string()),
            total_results: 0,
            search_performed: true,
        }
    }
}

/// Scope of one search invocation.
///
/// Issuing a new ticket supersedes every older one: their publications are dropped.
/// Cancelling the old ticket is still up to the owner and is what stops its traffic.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    token: CancellationToken,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle that cancels this run
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs searches across books and publishes their state.
#[derive(Debug)]
pub struct SearchOrchestrator {
    fetcher: RangeBatchFetcher,
    state: watch::Sender<SearchState>,
    generation: AtomicU64,
}

impl SearchOrchestrator {
    pub fn new(source: Arc<dyn HadithSource>, options: SearchOptions) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            fetcher: RangeBatchFetcher::new(source, options),
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Start a fresh cancellation scope for the next search
    pub fn ticket(&self) -> SearchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket {
            generation,
            token: CancellationToken::new(),
        }
    }

    /// Snapshot of the latest published state
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver observing every publication, including per-book progress
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Reset to the never-searched state. Runs still in flight can no longer publish.
    pub fn clear_search(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SearchState::default());
    }

    /// Page of the current results, [`DEFAULT_ITEMS_PER_PAGE`] per page unless given
    pub fn page(&self, page_number: usize, items_per_page: Option<usize>) -> PageView<Record> {
        let per_page = items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE);
        ResultPager::page(&self.state.borrow().results, page_number, per_page)
    }

    /// Search `collections` (or only `selected_id`) for records matching every word of `query`.
    ///
    /// Books are scanned one after another in the given order. A failing book is
    /// logged and skipped; cancellation ends the run quietly with what was found so far.
    /// The final state is published (unless superseded) and returned.
    pub async fn search(
        &self,
        ticket: &SearchTicket,
        query: &str,
        collections: &[Collection],
        selected_id: Option<&str>,
    ) -> SearchState {
        let matcher = QueryMatcher::new(query);
        if matcher.is_empty() {
            debug!("Empty query, resetting search state");
            let state = SearchState::default();
            self.publish(ticket, state.clone());
            return state;
        }

        let previous = self.state();
        self.publish(
            ticket,
            SearchState {
                loading: true,
                error: None,
                search_performed: true,
                ..previous
            },
        );

        let targets: Vec<&Collection> = match selected_id {
            Some(id) => collections.iter().filter(|c| c.id == id).collect(),
            None => collections.iter().collect(),
        };

        if targets.is_empty() {
            let error = SearchError::NoCollectionsAvailable;
            warn!("Search for '{}' aborted: {}", query, error);
            let state = SearchState::failed(&error);
            self.publish(ticket, state.clone());
            return state;
        }

        info!(
            "Searching {} books for '{}' (words: {:?})",
            targets.len(),
            query,
            matcher.words()
        );

        let mut found: Vec<Record> = Vec::new();
        for collection in targets {
            if ticket.is_cancelled() {
                info!("Search cancelled before {}", collection.name);
                break;
            }

            match self.fetcher.fetch_matches(collection, &matcher, &ticket.token).await {
                Ok(matches) => found.extend(matches),
                Err(SearchError::Cancelled) => {
                    info!("Search cancelled while scanning {}", collection.name);
                    break;
                }
                Err(e) => {
                    warn!("Failed to search in {}: {}", collection.name, e);
                    continue;
                }
            }

            let mut progress = found.clone();
            sort_results(&mut progress);
            self.publish(
                ticket,
                SearchState {
                    loading: true,
                    ..SearchState::finished(progress)
                },
            );
        }

        sort_results(&mut found);
        let state = SearchState::finished(found);
        info!(
            "Search for '{}' finished with {} results{}",
            query,
            state.total_results,
            if ticket.is_cancelled() { " (cancelled)" } else { "" }
        );
        self.publish(ticket, state.clone());
        state
    }

    /// Publish unless `ticket` has been superseded
    fn publish(&self, ticket: &SearchTicket, state: SearchState) -> bool {
        let published = self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != ticket.generation {
                return false;
            }
            *current = state;
            true
        });
        if !published {
            debug!("Dropping state of superseded search #{}", ticket.generation);
        }
        published
    }
}

/// Order by book name, then record number; drop repeated `(book id, number)` pairs
pub fn sort_results(results: &mut Vec<Record>) {
    // first occurrence wins, whatever book name it carries
    let mut seen = HashSet::new();
    results.retain(|r| seen.insert((r.collection.id.clone(), r.contents.number)));

    results.sort_by(|a, b| {
        a.collection
            .name
            .cmp(&b.collection.name)
            .then(a.contents.number.cmp(&b.contents.number))
            .then_with(|| a.collection.id.cmp(&b.collection.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordContent;

    fn record(id: &str, name: &str, number: u32) -> Record {
        Record::new(
            Collection::new(id, name, 100),
            RecordContent {
                number,
                primary_text: String::new(),
                translated_text: format!("{id} {number}"),
            },
        )
    }

    #[test]
    fn test_sort_by_name_then_number() {
        let mut results = vec![
            record("muslim", "HR. Muslim", 3),
            record("bukhari", "HR. Bukhari", 20),
            record("muslim", "HR. Muslim", 1),
            record("bukhari", "HR. Bukhari", 2),
        ];
        sort_results(&mut results);

        let keys: Vec<(&str, u32)> = results
            .iter()
            .map(|r| (r.collection_id(), r.number()))
            .collect();
        assert_eq!(
            keys,
            vec![("bukhari", 2), ("bukhari", 20), ("muslim", 1), ("muslim", 3)]
        );
    }

    #[test]
    fn test_sort_drops_duplicates() {
        let mut results = vec![
            record("bukhari", "HR. Bukhari", 5),
            record("bukhari", "HR. Bukhari", 5),
            record("other", "HR. Bukhari", 5),
        ];
        sort_results(&mut results);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_sort_drops_duplicates_with_different_names() {
        let mut results = vec![
            record("bukhari", "HR. Bukhari", 5),
            record("muslim", "HR. Muslim", 1),
            record("bukhari", "Shahih Bukhari", 5),
        ];
        sort_results(&mut results);

        let keys: Vec<(&str, u32)> = results
            .iter()
            .map(|r| (r.collection_id(), r.number()))
            .collect();
        assert_eq!(keys, vec![("bukhari", 5), ("muslim", 1)]);
        assert_eq!(results[0].collection_name(), "HR. Bukhari");
    }

    #[test]
    fn test_newer_ticket_supersedes() {
        #[derive(Debug)]
        struct NoSource;

        #[async_trait::async_trait]
        impl HadithSource for NoSource {
            async fn list_collections(&self) -> Result<Vec<Collection>, SearchError> {
                Ok(Vec::new())
            }
            async fn fetch_record(&self, _id: &str, _number: u32) -> Result<Record, SearchError> {
                Err(SearchError::Transport("offline".to_string()))
            }
            async fn fetch_range(
                &self,
                _collection: &Collection,
                _start: u32,
                _end: u32,
            ) -> Result<Vec<Record>, SearchError> {
                Ok(Vec::new())
            }
        }

        let orchestrator = SearchOrchestrator::new(Arc::new(NoSource), SearchOptions::default());
        let old = orchestrator.ticket();
        let new = orchestrator.ticket();
        assert!(new.generation() > old.generation());

        assert!(!orchestrator.publish(&old, SearchState::finished(vec![record("a", "A", 1)])));
        assert_eq!(orchestrator.state(), SearchState::default());

        assert!(orchestrator.publish(&new, SearchState::finished(Vec::new())));
        assert!(orchestrator.state().search_performed);

        orchestrator.clear_search();
        assert!(!orchestrator.publish(&new, SearchState::finished(Vec::new())));
        assert!(!orchestrator.state().search_performed);
    }
}
