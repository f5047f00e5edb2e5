use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::search::{SampleOptions, SearchOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.hadith.gading.dev";

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root URL of the hadith API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Records requested per range call
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Upper bound of record numbers scanned per book
    #[serde(default = "default_max_per_collection")]
    pub max_per_collection: u32,

    /// Pause between two range calls (milliseconds)
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Draws made by the random record picker before giving up
    #[serde(default = "default_sample_attempts")]
    pub sample_attempts: u32,

    /// Pause between two random draws (milliseconds)
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u64,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_batch_size() -> u32 {
    50
}

fn default_max_per_collection() -> u32 {
    200
}

fn default_batch_delay_ms() -> u64 {
    100
}

fn default_sample_attempts() -> u32 {
    10
}

fn default_sample_delay_ms() -> u64 {
    300
}

fn default_items_per_page() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            batch_size: default_batch_size(),
            max_per_collection: default_max_per_collection(),
            batch_delay_ms: default_batch_delay_ms(),
            sample_attempts: default_sample_attempts(),
            sample_delay_ms: default_sample_delay_ms(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl Config {
    /// Default location of the config file (`<config dir>/hadith-search/config.json`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hadith-search")
            .join(CONFIG_FILE_NAME)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is tried and
    /// defaults are used when no file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", path);
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            batch_size: self.batch_size.max(1),
            max_per_collection: self.max_per_collection,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }

    pub fn sample_options(&self) -> SampleOptions {
        SampleOptions {
            max_attempts: self.sample_attempts,
            retry_delay: Duration::from_millis(self.sample_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
