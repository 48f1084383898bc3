//! Record cache trait.

use crate::error::Result;
use crate::models::Funder;

/// Versioned, persistent key-value store of funder records keyed by `id`.
///
/// All operations are synchronous to match rusqlite's API; async callers move
/// them onto the blocking pool. Read order is unspecified.
pub trait RecordCache: Send + Sync {
    /// Create the underlying storage if needed. Idempotent.
    ///
    /// Fails with `StorageUnavailable` when the platform refuses persistent
    /// storage.
    fn open(&self) -> Result<()>;

    /// Every stored record.
    fn get_all(&self) -> Result<Vec<Funder>>;

    /// Upsert a batch atomically: afterwards either every record in the batch
    /// is visible or, on error, none are.
    fn put_batch(&self, records: &[Funder]) -> Result<()>;

    /// Version marker, `None` when never set.
    fn get_version(&self) -> Result<Option<String>>;

    fn set_version(&self, version: &str) -> Result<()>;

    /// Drop the version marker so the stored records no longer count as
    /// complete.
    fn clear_version(&self) -> Result<()>;

    /// Remove all records. The version marker is kept.
    fn clear(&self) -> Result<()>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;
}
