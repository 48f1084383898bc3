//! Startup ingestion: cache check, download, persist, index.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::source::DatasetSource;
use super::state::{DataOrigin, IngestPhase, IngestSnapshot};
use crate::cache::RecordCache;
use crate::config::IngestConfig;
use crate::decoder::{decode_stream, DecodeHandler, ParseFailure, Progress};
use crate::error::{FunderError, Result};
use crate::models::{FacetOptions, Funder};
use crate::search::SearchIndex;

fn join_error(err: tokio::task::JoinError) -> FunderError {
    FunderError::Other(format!("Background task failed: {}", err))
}

/// Owns one ingestion run and the resulting dataset.
///
/// Construct with [`OrchestratorBuilder`](super::OrchestratorBuilder). Each
/// instance is independent, so tests can run several side by side.
pub struct Orchestrator {
    source: Arc<dyn DatasetSource>,
    cache: Option<Arc<dyn RecordCache>>,
    config: IngestConfig,
    state_tx: watch::Sender<IngestSnapshot>,
    /// Set once `run` has started; guards against a second run.
    has_run: Mutex<bool>,
}

impl Orchestrator {
    pub(crate) fn new(
        source: Arc<dyn DatasetSource>,
        cache: Option<Arc<dyn RecordCache>>,
        config: IngestConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(IngestSnapshot::default());
        Self {
            source,
            cache,
            config,
            state_tx,
            has_run: Mutex::new(false),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Current snapshot.
    pub fn state(&self) -> IngestSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<IngestSnapshot> {
        self.state_tx.subscribe()
    }

    /// Drive ingestion to `Ready` or `Error` and return the final snapshot.
    ///
    /// Only the first call does any work; later calls (including concurrent
    /// ones, which wait) return the current snapshot. Failures are reported
    /// through the snapshot's `error`, not as an `Err`.
    pub async fn run(&self) -> IngestSnapshot {
        let mut has_run = self.has_run.lock().await;
        if *has_run {
            return self.state();
        }
        *has_run = true;

        let started = Instant::now();
        match self.ingest().await {
            Ok(()) => info!(
                "Ingestion finished in {:?} with {} funders",
                started.elapsed(),
                self.state_tx.borrow().records.len()
            ),
            Err(e) => {
                error!("Ingestion failed: {}", e);
                self.state_tx.send_modify(|s| {
                    s.phase = IngestPhase::Error;
                    s.status = format!("Error: {}", e);
                    s.error = Some(e.to_string());
                });
            }
        }

        self.state()
    }

    /// Drop the resident dataset and return to `Idle` so `run` can start over.
    pub async fn dispose(&self) {
        let mut has_run = self.has_run.lock().await;
        *has_run = false;
        self.state_tx.send_replace(IngestSnapshot::default());
        debug!("Orchestrator disposed");
    }

    fn publish(&self, update: impl FnOnce(&mut IngestSnapshot)) {
        self.state_tx.send_modify(|s| {
            update(s);
            debug!("Ingest phase {}: {}", s.phase, s.status);
        });
    }

    async fn ingest(&self) -> Result<()> {
        self.publish(|s| {
            *s = IngestSnapshot {
                phase: IngestPhase::CheckingCache,
                status: "Loading from cache...".to_string(),
                cache_enabled: self.cache.is_some(),
                ..IngestSnapshot::default()
            };
        });

        let mut cache = self.open_cache().await?;
        if let Some(opened) = cache.clone() {
            match self.read_cache(opened).await {
                Ok(Some(records)) => {
                    info!("Cache hit: {} funders", records.len());
                    let count = records.len();
                    let records = Arc::new(records);
                    self.publish(|s| {
                        s.phase = IngestPhase::CacheHit;
                        s.status = format!("Loaded {} funders from cache", count);
                        s.progress = Some(1.0);
                        s.records_loaded = count;
                        s.records = records.clone();
                        s.origin = Some(DataOrigin::Cache);
                    });
                    return self.build_index(records).await;
                }
                Ok(None) => {}
                Err(e) => {
                    self.degrade("Failed to read cache", e)?;
                    cache = None;
                }
            }
        }

        let cache = match cache {
            Some(cache) => self.reset_cache(cache).await?,
            None => None,
        };
        let records = self.download(cache).await?;
        self.build_index(records).await
    }

    /// Storage errors disable the cache for this session; anything else ends
    /// the run.
    fn degrade(&self, context: &str, err: FunderError) -> Result<()> {
        if err.is_fatal_to_ingestion() {
            return Err(err);
        }
        warn!("{}, continuing without cache: {}", context, err);
        self.publish(|s| s.cache_enabled = false);
        Ok(())
    }

    async fn open_cache(&self) -> Result<Option<Arc<dyn RecordCache>>> {
        let Some(cache) = self.cache.clone() else {
            return Ok(None);
        };
        let opener = cache.clone();
        let opened = tokio::task::spawn_blocking(move || opener.open())
            .await
            .map_err(join_error)
            .and_then(|r| r);

        match opened {
            Ok(()) => Ok(Some(cache)),
            Err(e) => {
                self.degrade("Cache unavailable", e)?;
                Ok(None)
            }
        }
    }

    /// Cached records if the version matches and the cache is non-empty.
    async fn read_cache(&self, cache: Arc<dyn RecordCache>) -> Result<Option<Vec<Funder>>> {
        let expected = self.config.data_version.clone();
        tokio::task::spawn_blocking(move || {
            let stored = cache.get_version()?;
            if stored.as_deref() != Some(expected.as_str()) {
                info!(
                    "Cache version {:?} does not match {:?}, downloading",
                    stored, expected
                );
                return Ok(None);
            }

            let records = cache.get_all()?;
            if records.is_empty() {
                info!("Cache is empty, downloading");
                return Ok(None);
            }
            Ok(Some(records))
        })
        .await
        .map_err(join_error)?
    }

    /// Drop the version marker and stale records before a download.
    ///
    /// The marker goes first, so a run that stops part way never leaves a
    /// partial record set that reads as complete.
    async fn reset_cache(
        &self,
        cache: Arc<dyn RecordCache>,
    ) -> Result<Option<Arc<dyn RecordCache>>> {
        let resetter = cache.clone();
        let reset = tokio::task::spawn_blocking(move || {
            resetter.clear_version()?;
            resetter.clear()
        })
        .await
        .map_err(join_error)
        .and_then(|r| r);

        match reset {
            Ok(()) => Ok(Some(cache)),
            Err(e) => {
                self.degrade("Failed to reset cache", e)?;
                Ok(None)
            }
        }
    }

    async fn download(&self, cache: Option<Arc<dyn RecordCache>>) -> Result<Arc<Vec<Funder>>> {
        info!("Downloading dataset from {}", self.source.describe());
        self.publish(|s| {
            s.phase = IngestPhase::Downloading;
            s.status = "Downloading funders data...".to_string();
            s.progress = Some(0.0);
            s.origin = Some(DataOrigin::Download);
        });

        let body = self.source.open().await?;
        if body.total_bytes.is_none() {
            self.publish(|s| s.progress = None);
        }

        let mut sink = IngestSink {
            tx: &self.state_tx,
            config: &self.config,
            cache,
            records: Vec::new(),
            flushed: 0,
            writes: Vec::new(),
            parse_errors: 0,
            last_progress: 0.0,
        };
        let count = decode_stream(body.stream, body.total_bytes, &mut sink).await?;
        sink.flush();
        info!(
            "Downloaded {} funders ({} unparseable lines skipped)",
            count, sink.parse_errors
        );

        let IngestSink {
            cache,
            records,
            writes,
            parse_errors,
            ..
        } = sink;
        let total = records.len();
        let records = Arc::new(records);
        self.publish(|s| {
            s.phase = IngestPhase::Persisting;
            s.status = format!("Loaded {} funders...", total);
            s.records_loaded = total;
            s.records = records.clone();
            s.parse_errors = parse_errors;
        });

        if let Some(cache) = cache {
            self.finish_persisting(cache, writes).await;
        }

        Ok(records)
    }

    /// Await batch writes, then mark the cache complete if they all landed.
    async fn finish_persisting(&self, cache: Arc<dyn RecordCache>, writes: Vec<JoinHandle<Result<()>>>) {
        let batches = writes.len();
        let mut failed = 0;
        for write in writes {
            match write.await.map_err(join_error).and_then(|r| r) {
                Ok(()) => {}
                Err(e) => {
                    failed += 1;
                    warn!("Cache batch write failed: {}", e);
                }
            }
        }

        if failed > 0 {
            warn!(
                "{} of {} cache batches failed; cache left without a version",
                failed, batches
            );
            self.publish(|s| s.cache_enabled = false);
            return;
        }

        let version = self.config.data_version.clone();
        let result = tokio::task::spawn_blocking(move || cache.set_version(&version))
            .await
            .map_err(join_error)
            .and_then(|r| r);
        match result {
            Ok(()) => debug!("Cached {} batches as version {}", batches, self.config.data_version),
            Err(e) => {
                warn!("Failed to store cache version: {}", e);
                self.publish(|s| s.cache_enabled = false);
            }
        }
    }

    async fn build_index(&self, records: Arc<Vec<Funder>>) -> Result<()> {
        self.publish(|s| {
            s.phase = IngestPhase::Indexing;
            s.status = "Building search index...".to_string();
        });

        let input = records.clone();
        let (index, facet_options) = tokio::task::spawn_blocking(move || {
            (SearchIndex::build(&input), FacetOptions::from_funders(&input))
        })
        .await
        .map_err(join_error)?;

        let count = records.len();
        let index = Arc::new(index);
        let facet_options = Arc::new(facet_options);
        self.publish(|s| {
            s.phase = IngestPhase::Ready;
            s.status = format!("Ready: {} funders", count);
            s.progress = Some(1.0);
            s.records_loaded = count;
            s.records = records;
            s.facet_options = facet_options;
            s.index = Some(index);
            s.error = None;
        });
        Ok(())
    }
}

/// Decoder handler that accumulates records, issues batch writes and
/// publishes throttled progress.
struct IngestSink<'a> {
    tx: &'a watch::Sender<IngestSnapshot>,
    config: &'a IngestConfig,
    cache: Option<Arc<dyn RecordCache>>,
    records: Vec<Funder>,
    /// Records before this index have been handed to a batch write.
    flushed: usize,
    writes: Vec<JoinHandle<Result<()>>>,
    parse_errors: usize,
    last_progress: f64,
}

impl IngestSink<'_> {
    /// Hand unwritten records to the blocking pool without waiting for them.
    fn flush(&mut self) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        if self.flushed == self.records.len() {
            return;
        }
        let batch = self.records[self.flushed..].to_vec();
        self.flushed = self.records.len();
        self.writes
            .push(tokio::task::spawn_blocking(move || cache.put_batch(&batch)));
    }
}

impl DecodeHandler<Funder> for IngestSink<'_> {
    fn on_record(&mut self, record: Funder, count: usize) {
        self.records.push(record);
        if self.records.len() - self.flushed >= self.config.batch_size {
            self.flush();
        }

        if count % self.config.status_interval.max(1) == 0 {
            self.tx.send_modify(|s| {
                s.status = format!("Loaded {} funders...", count);
                s.records_loaded = count;
            });
        }
    }

    fn on_progress(&mut self, progress: Progress) {
        let Progress::Fraction(fraction) = progress else {
            return;
        };
        if fraction >= 1.0 || fraction - self.last_progress >= self.config.progress_step {
            self.last_progress = fraction;
            self.tx.send_modify(|s| s.progress = Some(fraction));
        }
    }

    fn on_parse_error(&mut self, failure: ParseFailure) {
        self.parse_errors += 1;
        warn!(
            "Skipping unparseable line {}: {}",
            failure.line_number, failure.message
        );
    }
}
