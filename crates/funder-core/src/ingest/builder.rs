//! Builder for [`Orchestrator`].

use std::path::PathBuf;
use std::sync::Arc;

use super::orchestrator::Orchestrator;
use super::source::{DatasetSource, FileDatasetSource, HttpDatasetSource};
use crate::cache::{RecordCache, SqliteRecordCache};
use crate::config::IngestConfig;
use crate::error::{FunderError, Result};

/// Builder for configuring an [`Orchestrator`].
///
/// Exactly one dataset location is required: a URL, a local file, or a
/// custom [`DatasetSource`].
///
/// # Example
///
/// ```rust,no_run
/// use funder_core::OrchestratorBuilder;
///
/// # async fn example() -> funder_core::Result<()> {
/// let orchestrator = OrchestratorBuilder::new()
///     .dataset_url("https://example.org/funders.jsonl")
///     .cache_dir("/tmp/funders")
///     .build()?;
/// let snapshot = orchestrator.run().await;
/// println!("{} funders", snapshot.records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    dataset_url: Option<String>,
    dataset_file: Option<PathBuf>,
    source: Option<Arc<dyn DatasetSource>>,
    cache_dir: Option<PathBuf>,
    cache: Option<Arc<dyn RecordCache>>,
    without_cache: bool,
    config: IngestConfig,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the dataset over HTTP.
    pub fn dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = Some(url.into());
        self
    }

    /// Read the dataset from a local file.
    pub fn dataset_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_file = Some(path.into());
        self
    }

    /// Use a custom dataset source.
    pub fn source(mut self, source: Arc<dyn DatasetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Persist the SQLite cache under this directory.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Use a custom cache implementation.
    pub fn cache(mut self, cache: Arc<dyn RecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Never read or write a cache; always download.
    pub fn without_cache(mut self) -> Self {
        self.without_cache = true;
        self
    }

    /// Version the cache must carry to be reused.
    ///
    /// Default: [`DatasetConfig::DATA_VERSION`](crate::config::DatasetConfig::DATA_VERSION)
    pub fn data_version(mut self, version: impl Into<String>) -> Self {
        self.config.data_version = version.into();
        self
    }

    /// Records per cache write transaction.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Records between progressive status publications.
    pub fn status_interval(mut self, interval: usize) -> Self {
        self.config.status_interval = interval;
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        if self.config.batch_size == 0 {
            return Err(FunderError::Validation {
                field: "batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.config.data_version.trim().is_empty() {
            return Err(FunderError::Validation {
                field: "data_version".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let source: Arc<dyn DatasetSource> =
            match (self.source, self.dataset_url, self.dataset_file) {
                (Some(source), None, None) => source,
                (None, Some(url), None) => {
                    url::Url::parse(&url).map_err(|e| FunderError::Validation {
                        field: "dataset_url".to_string(),
                        message: format!("{}: {}", url, e),
                    })?;
                    Arc::new(HttpDatasetSource::new(url)?)
                }
                (None, None, Some(path)) => Arc::new(FileDatasetSource::new(path)),
                (source, url, file) => {
                    let given = [source.is_some(), url.is_some(), file.is_some()]
                        .iter()
                        .filter(|set| **set)
                        .count();
                    return Err(FunderError::Config {
                        message: format!(
                            "exactly one dataset location is required, {} given",
                            given
                        ),
                    });
                }
            };

        let cache: Option<Arc<dyn RecordCache>> = if self.without_cache {
            None
        } else if let Some(cache) = self.cache {
            Some(cache)
        } else {
            self.cache_dir
                .map(|dir| Arc::new(SqliteRecordCache::in_directory(dir)) as Arc<dyn RecordCache>)
        };

        Ok(Orchestrator::new(source, cache, self.config))
    }
}
