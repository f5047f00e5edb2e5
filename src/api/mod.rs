pub mod client;
pub mod envelope;
pub mod models;
pub mod source;

pub use client::HadithClient;
pub use models::{Collection, Record, RecordContent};
pub use source::HadithSource;
