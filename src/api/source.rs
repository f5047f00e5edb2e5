use async_trait::async_trait;
use std::fmt::Debug;

use super::models::{Collection, Record};
use crate::error::SearchError;

/// Read-only capability of the remote hadith store.
///
/// The store has no search endpoint; everything the core does is built on these calls.
#[async_trait]
pub trait HadithSource: Send + Sync + Debug {
    /// List all books
    async fn list_collections(&self) -> Result<Vec<Collection>, SearchError>;

    /// Fetch one record by book id and number
    async fn fetch_record(&self, collection_id: &str, number: u32) -> Result<Record, SearchError>;

    /// Fetch records `start..=end` of a book
    async fn fetch_range(
        &self,
        collection: &Collection,
        start: u32,
        end: u32,
    ) -> Result<Vec<Record>, SearchError>;
}
