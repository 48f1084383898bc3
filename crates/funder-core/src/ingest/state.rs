//! Observable ingestion state.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::models::{FacetOptions, Funder};
use crate::search::SearchIndex;

/// Where ingestion currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestPhase {
    /// Not started, or disposed.
    #[default]
    Idle,
    CheckingCache,
    /// Usable cached records were found; no download will happen.
    CacheHit,
    Downloading,
    /// Waiting for outstanding cache writes after the stream ended.
    Persisting,
    Indexing,
    Ready,
    Error,
}

impl IngestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestPhase::Idle => "idle",
            IngestPhase::CheckingCache => "checking-cache",
            IngestPhase::CacheHit => "cache-hit",
            IngestPhase::Downloading => "downloading",
            IngestPhase::Persisting => "persisting",
            IngestPhase::Indexing => "indexing",
            IngestPhase::Ready => "ready",
            IngestPhase::Error => "error",
        }
    }

    /// Ready and Error end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestPhase::Ready | IngestPhase::Error)
    }
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the resident records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Cache,
    Download,
}

/// Everything a presentation layer needs to render the loading and ready
/// states. Cloning is cheap: the record list and index are shared.
#[derive(Debug, Clone, Default)]
pub struct IngestSnapshot {
    pub phase: IngestPhase,
    /// Status line, e.g. `Loaded 1500 funders...`.
    pub status: String,
    /// Byte progress in `[0, 1]`; `None` while it cannot be computed.
    pub progress: Option<f64>,
    pub records_loaded: usize,
    /// Resident records. Empty while downloading (only `records_loaded`
    /// advances); set once the stream ends or the cache has been read.
    pub records: Arc<Vec<Funder>>,
    pub facet_options: Arc<FacetOptions>,
    pub index: Option<Arc<SearchIndex>>,
    pub error: Option<String>,
    pub origin: Option<DataOrigin>,
    /// Dataset lines skipped because they did not parse.
    pub parse_errors: usize,
    /// False once the cache has been disabled for this session.
    pub cache_enabled: bool,
}

impl IngestSnapshot {
    pub fn is_ready(&self) -> bool {
        self.phase == IngestPhase::Ready
    }

    pub fn is_loading(&self) -> bool {
        !self.phase.is_terminal() && self.phase != IngestPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(IngestPhase::CheckingCache.to_string(), "checking-cache");
        assert_eq!(
            serde_json::to_string(&IngestPhase::CacheHit).unwrap(),
            "\"cache-hit\""
        );
    }

    #[test]
    fn test_default_snapshot_is_idle() {
        let snapshot = IngestSnapshot::default();
        assert_eq!(snapshot.phase, IngestPhase::Idle);
        assert!(!snapshot.is_loading());
        assert!(snapshot.records.is_empty());
        assert!(snapshot.index.is_none());
    }
}
