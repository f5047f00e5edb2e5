use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{HadithSource, Record};
use crate::error::SearchError;

pub const DEFAULT_SAMPLE_ATTEMPTS: u32 = 10;

pub const DEFAULT_SAMPLE_DELAY: Duration = Duration::from_millis(300);

/// Draw bound for books missing from [`KNOWN_COLLECTION_MAX`]
pub const UNKNOWN_COLLECTION_MAX: u32 = 500;

/// Numbers above this are sparse on the remote store and rarely resolve
pub const DENSE_RANGE_CAP: u32 = 1000;

/// Highest record number of the well-known books
const KNOWN_COLLECTION_MAX: &[(&str, u32)] = &[
    ("abu-daud", 4590),
    ("ahmad", 26363),
    ("bukhari", 7008),
    ("darimi", 3367),
    ("ibnu-majah", 4331),
    ("malik", 1594),
    ("muslim", 5362),
    ("nasai", 5662),
    ("tirmidzi", 3891),
];

/// Upper bound (inclusive) of the random draw for a book
pub fn draw_upper_bound(collection_id: &str) -> u32 {
    KNOWN_COLLECTION_MAX
        .iter()
        .find(|(id, _)| *id == collection_id)
        .map(|&(_, max)| max)
        .unwrap_or(UNKNOWN_COLLECTION_MAX)
        .min(DENSE_RANGE_CAP)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOptions {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SAMPLE_ATTEMPTS,
            retry_delay: DEFAULT_SAMPLE_DELAY,
        }
    }
}

/// Picks a random record of a book that has text in both scripts.
///
/// The store has no random endpoint, so numbers are drawn and fetched one by one
/// until a complete record turns up.
#[derive(Debug)]
pub struct RandomSampleRetriever {
    source: Arc<dyn HadithSource>,
    options: SampleOptions,
    rng: Mutex<StdRng>,
}

impl RandomSampleRetriever {
    pub fn new(source: Arc<dyn HadithSource>, options: SampleOptions) -> Self {
        Self::with_rng(source, options, StdRng::from_entropy())
    }

    /// Deterministic draws, for reproducible runs
    pub fn with_seed(source: Arc<dyn HadithSource>, options: SampleOptions, seed: u64) -> Self {
        Self::with_rng(source, options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(source: Arc<dyn HadithSource>, options: SampleOptions, rng: StdRng) -> Self {
        Self {
            source,
            options,
            rng: Mutex::new(rng),
        }
    }

    pub async fn sample(&self, collection_id: &str) -> Result<Record, SearchError> {
        self.sample_with_attempts(collection_id, self.options.max_attempts)
            .await
    }

    pub async fn sample_with_attempts(
        &self,
        collection_id: &str,
        max_attempts: u32,
    ) -> Result<Record, SearchError> {
        let upper = draw_upper_bound(collection_id);
        debug!(
            "Sampling {} in 1..={} ({} attempts)",
            collection_id, upper, max_attempts
        );

        for attempt in 1..=max_attempts {
            let number = self.draw(upper);

            match self.source.fetch_record(collection_id, number).await {
                Ok(record) if record.is_complete() => {
                    info!(
                        "Picked {} #{} on attempt {}",
                        collection_id, number, attempt
                    );
                    return Ok(record);
                }
                Ok(_) => warn!(
                    "Attempt {}/{}: {} #{} has incomplete content",
                    attempt, max_attempts, collection_id, number
                ),
                Err(e) => warn!(
                    "Attempt {}/{}: failed to fetch {} #{}: {}",
                    attempt, max_attempts, collection_id, number, e
                ),
            }

            if attempt < max_attempts && !self.options.retry_delay.is_zero() {
                tokio::time::sleep(self.options.retry_delay).await;
            }
        }

        Err(SearchError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }

    fn draw(&self, upper: u32) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(1..=upper.max(1))
    }
}
