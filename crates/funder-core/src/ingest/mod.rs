//! Ingestion orchestration.
//!
//! On startup the [`Orchestrator`] either reuses a cache whose version marker
//! matches, or clears it and streams the dataset from its source, writing
//! batches back to the cache while the download continues. Both paths end by
//! indexing the resident records. Progress is published through a
//! `tokio::sync::watch` channel of [`IngestSnapshot`] values.

mod builder;
mod orchestrator;
mod source;
mod state;

pub use builder::OrchestratorBuilder;
pub use orchestrator::Orchestrator;
pub use source::{
    ByteStream, DatasetBody, DatasetSource, FileDatasetSource, HttpDatasetSource,
    MemoryDatasetSource,
};
pub use state::{DataOrigin, IngestPhase, IngestSnapshot};
