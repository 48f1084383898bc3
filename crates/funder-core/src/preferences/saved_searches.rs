//! Named snapshots of the search and filter state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use super::atomic::{read_json, write_json};
use crate::config::PreferencesConfig;
use crate::models::{FilterState, SortSpec};

/// Everything needed to re-run a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedQuery {
    pub search_term: String,
    pub filters: FilterState,
    pub sort: SortSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub query: SavedQuery,
}

/// Saved searches, newest last, persisted after every change.
#[derive(Debug)]
pub struct SavedSearchStore {
    path: Option<PathBuf>,
    searches: Vec<SavedSearch>,
}

impl SavedSearchStore {
    /// Load from `<dir>/funders-saved-searches.json`.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(PreferencesConfig::SAVED_SEARCHES_FILE);
        let searches = match read_json::<Vec<SavedSearch>>(&path) {
            Ok(Some(searches)) => searches,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable saved searches: {}", e);
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            searches,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            searches: Vec::new(),
        }
    }

    /// Store `query` under `name`. Names need not be unique.
    pub fn save(&mut self, name: impl Into<String>, query: SavedQuery) -> SavedSearch {
        let search = SavedSearch {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            query,
        };
        self.searches.push(search.clone());
        self.persist();
        search
    }

    /// Remove a saved search. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.searches.len();
        self.searches.retain(|s| s.id != id);
        let removed = self.searches.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.searches.clear();
        self.persist();
    }

    pub fn list(&self) -> &[SavedSearch] {
        &self.searches
    }

    pub fn get(&self, id: &str) -> Option<&SavedSearch> {
        self.searches.iter().find(|s| s.id == id)
    }

    fn persist(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = write_json(path, &self.searches) {
                warn!("Failed to save searches: {}", e);
            }
        }
    }
}
