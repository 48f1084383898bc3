//! In-process record cache.

use super::traits::RecordCache;
use crate::error::Result;
use crate::models::Funder;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<String, Funder>,
    version: Option<String>,
}

/// [`RecordCache`] that lives only as long as the value itself.
///
/// Used when persistence is not wanted and as a test double for the
/// orchestrator.
#[derive(Debug, Default)]
pub struct MemoryRecordCache {
    state: RwLock<MemoryState>,
}

impl MemoryRecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with `records` under `version`.
    pub fn seeded(version: &str, records: Vec<Funder>) -> Self {
        let records = records.into_iter().map(|f| (f.id.clone(), f)).collect();
        Self {
            state: RwLock::new(MemoryState {
                records,
                version: Some(version.to_string()),
            }),
        }
    }
}

impl RecordCache for MemoryRecordCache {
    fn open(&self) -> Result<()> {
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Funder>> {
        let state = self.state.read().expect("memory cache lock poisoned");
        Ok(state.records.values().cloned().collect())
    }

    fn put_batch(&self, records: &[Funder]) -> Result<()> {
        let mut state = self.state.write().expect("memory cache lock poisoned");
        for funder in records {
            state.records.insert(funder.id.clone(), funder.clone());
        }
        Ok(())
    }

    fn get_version(&self) -> Result<Option<String>> {
        let state = self.state.read().expect("memory cache lock poisoned");
        Ok(state.version.clone())
    }

    fn set_version(&self, version: &str) -> Result<()> {
        let mut state = self.state.write().expect("memory cache lock poisoned");
        state.version = Some(version.to_string());
        Ok(())
    }

    fn clear_version(&self) -> Result<()> {
        let mut state = self.state.write().expect("memory cache lock poisoned");
        state.version = None;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.write().expect("memory cache lock poisoned");
        state.records.clear();
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let state = self.state.read().expect("memory cache lock poisoned");
        Ok(state.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_cache() {
        let cache = MemoryRecordCache::seeded("1.0", vec![Funder::new("a", "Alpha")]);
        assert_eq!(cache.get_version().unwrap().as_deref(), Some("1.0"));
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[test]
    fn test_clear_keeps_version() {
        let cache = MemoryRecordCache::new();
        cache.put_batch(&[Funder::new("a", "Alpha"), Funder::new("a", "Again")]).unwrap();
        cache.set_version("3").unwrap();
        assert_eq!(cache.count().unwrap(), 1);

        cache.clear().unwrap();
        assert_eq!(cache.count().unwrap(), 0);
        assert_eq!(cache.get_version().unwrap().as_deref(), Some("3"));

        cache.clear_version().unwrap();
        assert_eq!(cache.get_version().unwrap(), None);
    }
}
