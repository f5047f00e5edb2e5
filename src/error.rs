use thiserror::Error;

/// Failure modes of the search core.
///
/// An empty query is not represented here: it is a no-op, not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The resolved set of collections to scan was empty.
    #[error("No books available for search")]
    NoCollectionsAvailable,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16 },

    /// The envelope's `error` flag was set.
    #[error("Remote error: {0}")]
    RemoteReported(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("No complete record found after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SearchError::MalformedResponse(e.to_string())
        } else {
            SearchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::MalformedResponse(e.to_string())
    }
}
