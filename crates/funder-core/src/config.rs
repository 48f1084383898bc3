//! Centralized configuration for the funder pipeline.
//!
//! Compile-time defaults live in constant-holder structs. Runtime settings for
//! a single ingestion run are carried by [`IngestConfig`].

use std::time::Duration;

/// Dataset and ingestion defaults.
pub struct DatasetConfig;

impl DatasetConfig {
    /// Bump this to force every client to re-download the dataset.
    pub const DATA_VERSION: &'static str = "1.0";
    pub const DATASET_PATH: &'static str = "/funders.jsonl";
    pub const CACHE_DB_NAME: &'static str = "funders-db";
    /// Records per cache transaction.
    pub const CACHE_BATCH_SIZE: usize = 100;
    /// Records between progressive status publications.
    pub const STATUS_UPDATE_INTERVAL: usize = 500;
    /// Minimum byte-progress advance between publications.
    pub const PROGRESS_STEP: f64 = 0.01;
}

/// Search index defaults.
pub struct SearchConfig;

impl SearchConfig {
    pub const DEFAULT_LIMIT: usize = 1000;

    pub const NAME_WEIGHT: f64 = 3.0;
    pub const INFORMATION_WEIGHT: f64 = 0.8;
    pub const FOCUS_WEIGHT: f64 = 0.7;
    pub const BENEFICIARIES_WEIGHT: f64 = 0.6;
    pub const CATEGORIES_WEIGHT: f64 = 0.5;
    pub const LOCATIONS_WEIGHT: f64 = 0.3;

    /// Shortest term that may match inside a token rather than at its start.
    pub const MIN_SUBSTRING_LEN: usize = 3;
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "funder-browser/0.1";
    pub const FILE_CHUNK_SIZE: usize = 64 * 1024;
}

/// File names for user-local preference storage.
pub struct PreferencesConfig;

impl PreferencesConfig {
    pub const FAVORITES_FILE: &'static str = "funders-favorites.json";
    pub const SAVED_SEARCHES_FILE: &'static str = "funders-saved-searches.json";
}

/// Runtime settings for one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Version marker the cache must carry to be reused.
    pub data_version: String,
    /// Records per cache write transaction.
    pub batch_size: usize,
    /// Records between progressive status publications.
    pub status_interval: usize,
    /// Minimum byte-progress advance between publications.
    pub progress_step: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_version: DatasetConfig::DATA_VERSION.to_string(),
            batch_size: DatasetConfig::CACHE_BATCH_SIZE,
            status_interval: DatasetConfig::STATUS_UPDATE_INTERVAL,
            progress_step: DatasetConfig::PROGRESS_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_outweighs_other_fields_combined() {
        let others = SearchConfig::INFORMATION_WEIGHT
            + SearchConfig::FOCUS_WEIGHT
            + SearchConfig::BENEFICIARIES_WEIGHT
            + SearchConfig::CATEGORIES_WEIGHT
            + SearchConfig::LOCATIONS_WEIGHT;
        assert!(SearchConfig::NAME_WEIGHT > others);
    }

    #[test]
    fn test_ingest_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.data_version, "1.0");
        assert_eq!(config.batch_size, 100);
        assert!(config.status_interval > config.batch_size);
    }
}
