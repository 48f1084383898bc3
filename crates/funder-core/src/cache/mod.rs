//! Versioned local cache of funder records.
//!
//! The cache lets a repeat session skip the dataset download. It holds the
//! records keyed by `id` plus one version marker; a marker that does not match
//! the expected data version means the records must be discarded.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryRecordCache;
pub use sqlite::SqliteRecordCache;
pub use traits::RecordCache;
