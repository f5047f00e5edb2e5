#![allow(dead_code)]

use async_trait::async_trait;
use hadith_search::search::CancellationToken;
use hadith_search::{Collection, HadithSource, Record, RecordContent, SearchError, SearchState};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::watch;

/// In-memory stand-in for the hadith API that records every request
#[derive(Debug, Default)]
pub struct FakeSource {
    books: Vec<Collection>,
    records: HashMap<String, Vec<Record>>,
    failing_windows: HashSet<(String, u32)>,
    malformed_windows: HashSet<(String, u32)>,
    record_errors: Mutex<VecDeque<SearchError>>,
    cancel_on: Mutex<Option<(String, u32, CancellationToken)>>,
    state_watch: Mutex<Option<(String, watch::Receiver<SearchState>)>>,
    /// States seen when the watched book's first window was requested
    pub observed_states: Mutex<Vec<SearchState>>,
    pub range_requests: Mutex<Vec<(String, u32, u32)>>,
    pub record_requests: Mutex<Vec<(String, u32)>>,
}

pub fn book(id: &str, name: &str, available: u32) -> Collection {
    Collection::new(id, name, available)
}

pub fn record(collection: &Collection, number: u32, arab: &str, translated: &str) -> Record {
    Record::new(
        collection.clone(),
        RecordContent {
            number,
            primary_text: arab.to_string(),
            translated_text: translated.to_string(),
        },
    )
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book whose every record says `filler`, except the given ones
    pub fn with_book(mut self, collection: Collection, texts: &[(u32, &str)]) -> Self {
        let overrides: HashMap<u32, &str> = texts.iter().copied().collect();
        let records = (1..=collection.available_count.min(1000))
            .map(|n| {
                let translated = overrides.get(&n).copied().unwrap_or("teks lain");
                record(&collection, n, "نص", translated)
            })
            .collect();
        self.records.insert(collection.id.clone(), records);
        self.books.push(collection);
        self
    }

    pub fn fail_window(mut self, book_id: &str, start: u32) -> Self {
        self.failing_windows.insert((book_id.to_string(), start));
        self
    }

    pub fn malformed_window(mut self, book_id: &str, start: u32) -> Self {
        self.malformed_windows.insert((book_id.to_string(), start));
        self
    }

    /// Fail the next single-record fetches with these errors, in order
    pub fn record_errors(self, errors: Vec<SearchError>) -> Self {
        *self.record_errors.lock().unwrap() = errors.into();
        self
    }

    /// Cancel `token` while serving the window of `book_id` that ends at `end`
    pub fn cancel_on(&self, book_id: &str, end: u32, token: CancellationToken) {
        *self.cancel_on.lock().unwrap() = Some((book_id.to_string(), end, token));
    }

    /// Snapshot the published state each time `book_id` starts being scanned
    pub fn observe_state_on(&self, book_id: &str, rx: watch::Receiver<SearchState>) {
        *self.state_watch.lock().unwrap() = Some((book_id.to_string(), rx));
    }

    pub fn books(&self) -> Vec<Collection> {
        self.books.clone()
    }

    pub fn windows_of(&self, book_id: &str) -> Vec<(u32, u32)> {
        self.range_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| id == book_id)
            .map(|&(_, start, end)| (start, end))
            .collect()
    }

    pub fn requested_books(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (id, _, _) in self.range_requests.lock().unwrap().iter() {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }
}

#[async_trait]
impl HadithSource for FakeSource {
    async fn list_collections(&self) -> Result<Vec<Collection>, SearchError> {
        Ok(self.books.clone())
    }

    async fn fetch_record(&self, collection_id: &str, number: u32) -> Result<Record, SearchError> {
        self.record_requests
            .lock()
            .unwrap()
            .push((collection_id.to_string(), number));

        if let Some(error) = self.record_errors.lock().unwrap().pop_front() {
            return Err(error);
        }

        let found = self
            .records
            .get(collection_id)
            .and_then(|records| records.iter().find(|r| r.number() == number))
            .cloned();

        // Unknown numbers exist on the remote but carry no text
        Ok(found.unwrap_or_else(|| {
            record(&book(collection_id, collection_id, 0), number, "", "")
        }))
    }

    async fn fetch_range(
        &self,
        collection: &Collection,
        start: u32,
        end: u32,
    ) -> Result<Vec<Record>, SearchError> {
        self.range_requests
            .lock()
            .unwrap()
            .push((collection.id.clone(), start, end));

        {
            let mut cancel_on = self.cancel_on.lock().unwrap();
            let hit = matches!(
                cancel_on.as_ref(),
                Some((id, at, _)) if *id == collection.id && *at == end
            );
            if hit {
                if let Some((_, _, token)) = cancel_on.take() {
                    token.cancel();
                }
            }
        }

        if start == 1 {
            if let Some((id, rx)) = self.state_watch.lock().unwrap().as_ref() {
                if *id == collection.id {
                    let snapshot = rx.borrow().clone();
                    self.observed_states.lock().unwrap().push(snapshot);
                }
            }
        }

        let key = (collection.id.clone(), start);
        if self.failing_windows.contains(&key) {
            return Err(SearchError::Transport("connection reset".to_string()));
        }
        if self.malformed_windows.contains(&key) {
            return Err(SearchError::MalformedResponse("unexpected payload".to_string()));
        }

        Ok(self
            .records
            .get(&collection.id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| (start..=end).contains(&r.number()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
