//! Funder Core - Headless data pipeline for browsing a dataset of charitable
//! funders.
//!
//! The pipeline streams a newline-delimited JSON dataset into memory, keeps a
//! versioned local cache so repeat sessions skip the download, builds a fuzzy
//! search index, and derives result lists through a pure filter/sort engine.
//! Preferences, URL state and export formatters sit on top of the engine's
//! output. Nothing here renders UI; presentation layers call in.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::collections::HashSet;
//! use funder_core::{FilterSortEngine, FilterState, OrchestratorBuilder, SortSpec};
//!
//! #[tokio::main]
//! async fn main() -> funder_core::Result<()> {
//!     let orchestrator = OrchestratorBuilder::new()
//!         .dataset_url("https://example.org/funders.jsonl")
//!         .cache_dir("/path/to/cache")
//!         .build()?;
//!
//!     let snapshot = orchestrator.run().await;
//!     let results = FilterSortEngine::apply(
//!         &snapshot.records,
//!         snapshot.index.as_deref(),
//!         "youth arts",
//!         &FilterState::default(),
//!         SortSpec::default(),
//!         &HashSet::new(),
//!         false,
//!     );
//!     println!("{} matching funders", results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod models;
pub mod network;
pub mod preferences;
pub mod search;
pub mod url_state;

// Re-export commonly used types
pub use cache::{MemoryRecordCache, RecordCache, SqliteRecordCache};
pub use config::{DatasetConfig, IngestConfig, NetworkConfig, PreferencesConfig, SearchConfig};
pub use decoder::{decode_stream, DecodeHandler, LineDecoder, ParseFailure, Progress};
pub use error::{FunderError, Result};
pub use export::{ExportFormat, ExportScope, LabelTemplate};
pub use filter::{FilterSortEngine, FilteredView};
pub use ingest::{
    DataOrigin, DatasetSource, FileDatasetSource, HttpDatasetSource, IngestPhase, IngestSnapshot,
    MemoryDatasetSource, Orchestrator, OrchestratorBuilder,
};
pub use models::{
    Contact, Facet, FacetOptions, Financial, FilterState, Funder, Social, SortDirection,
    SortField, SortSpec,
};
pub use preferences::{FavoritesStore, SavedQuery, SavedSearch, SavedSearchStore};
pub use search::{FieldMatch, MatchRange, SearchField, SearchHit, SearchIndex, SearchResults};
pub use url_state::UrlState;
