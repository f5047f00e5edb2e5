pub mod api;
pub mod config;
pub mod error;
pub mod search;

pub use api::{Collection, HadithClient, HadithSource, Record, RecordContent};
pub use config::Config;
pub use error::SearchError;
pub use search::{
    CancellationToken, PageView, RandomSampleRetriever, SearchOrchestrator, SearchState, SearchTicket,
};
