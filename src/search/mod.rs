// Module declarations
pub mod fetcher;
pub mod highlight;
pub mod matcher;
pub mod normalizer;
pub mod orchestrator;
pub mod pager;
pub mod sampler;

// Re-export public APIs
pub use fetcher::{RangeBatchFetcher, SearchOptions};
pub use highlight::{Segment, highlight};
pub use matcher::{QueryMatcher, matches};
pub use normalizer::normalize;
pub use orchestrator::{SearchOrchestrator, SearchState, SearchTicket, sort_results};
pub use pager::{PageView, ResultPager};
pub use sampler::{RandomSampleRetriever, SampleOptions};
pub use tokio_util::sync::CancellationToken;
