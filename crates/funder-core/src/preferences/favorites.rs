//! Favorited funder ids.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::atomic::{read_json, write_json};
use crate::config::PreferencesConfig;

/// Ordered set of favorite funder ids, saved after every change.
///
/// A missing or unreadable file starts an empty list; a failed save is logged
/// and the in-memory list stays authoritative.
#[derive(Debug)]
pub struct FavoritesStore {
    path: Option<PathBuf>,
    ids: Vec<String>,
}

impl FavoritesStore {
    /// Load favorites from `<dir>/funders-favorites.json`.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(PreferencesConfig::FAVORITES_FILE);
        let ids = match read_json::<Vec<String>>(&path) {
            Ok(Some(ids)) => ids,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable favorites: {}", e);
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            ids,
        }
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            ids: Vec::new(),
        }
    }

    /// Add or remove `id`. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now_favorite = match self.ids.iter().position(|existing| existing == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.save();
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.save();
    }

    /// Ids in the order they were added.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids as a set, the shape the filter engine takes.
    pub fn as_set(&self) -> HashSet<String> {
        self.ids.iter().cloned().collect()
    }

    fn save(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = write_json(path, &self.ids) {
                warn!("Failed to save favorites: {}", e);
            }
        }
    }
}
