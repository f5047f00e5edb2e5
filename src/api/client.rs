use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use super::envelope::{self, ApiEnvelope};
use super::models::{Collection, Record};
use super::source::HadithSource;
use crate::config::Config;
use crate::error::SearchError;

/// HTTP client for the hadith API
#[derive(Debug, Clone)]
pub struct HadithClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HadithClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hadith-search/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        // Trailing slash so that `join` appends instead of replacing the last segment
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url =
            Url::parse(&base).with_context(|| format!("Invalid base URL: {base_url}"))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    fn books_url(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.join("books").map_err(invalid_url)?;
        url.path_segments_mut()
            .map_err(|_| SearchError::Transport("base URL cannot carry path segments".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and return the envelope's payload
    async fn get_data(&self, url: Url) -> Result<serde_json::Value, SearchError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!("Fetch error for {}: {:?}", url, e);
            SearchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("HTTP error for {}: status {}", url, status);
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        ApiEnvelope::from_slice(&body)?.into_data()
    }
}

#[async_trait]
impl HadithSource for HadithClient {
    async fn list_collections(&self) -> Result<Vec<Collection>, SearchError> {
        let url = self.books_url(&[])?;
        envelope::decode_collections(self.get_data(url).await?)
    }

    async fn fetch_record(&self, collection_id: &str, number: u32) -> Result<Record, SearchError> {
        let url = self.books_url(&[collection_id, &number.to_string()])?;
        envelope::decode_record(self.get_data(url).await?, collection_id)
    }

    async fn fetch_range(
        &self,
        collection: &Collection,
        start: u32,
        end: u32,
    ) -> Result<Vec<Record>, SearchError> {
        let mut url = self.books_url(&[&collection.id])?;
        url.query_pairs_mut()
            .append_pair("range", &format!("{start}-{end}"));
        envelope::decode_range(self.get_data(url).await?, collection)
    }
}

fn invalid_url(e: url::ParseError) -> SearchError {
    SearchError::Transport(format!("invalid URL: {e}"))
}
