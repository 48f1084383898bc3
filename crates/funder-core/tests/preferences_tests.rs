//! Integration tests for favorites and saved searches on disk.

use funder_core::config::PreferencesConfig;
use funder_core::{FavoritesStore, FilterState, SavedQuery, SavedSearchStore, SortField, SortSpec};
use tempfile::TempDir;

#[test]
fn test_favorites_survive_reload() {
    let temp_dir = TempDir::new().unwrap();

    let mut favorites = FavoritesStore::load(temp_dir.path());
    assert!(favorites.is_empty());
    favorites.toggle("5f26");
    favorites.toggle("a1b2");
    favorites.toggle("c3d4");
    favorites.toggle("a1b2");

    let reloaded = FavoritesStore::load(temp_dir.path());
    assert_eq!(reloaded.ids(), ["5f26".to_string(), "c3d4".to_string()]);
    assert!(reloaded.as_set().contains("c3d4"));
}

#[test]
fn test_corrupt_favorites_start_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(PreferencesConfig::FAVORITES_FILE),
        "{ not json",
    )
    .unwrap();

    let mut favorites = FavoritesStore::load(temp_dir.path());
    assert!(favorites.is_empty());

    // The next change overwrites the corrupt file.
    favorites.toggle("x");
    assert_eq!(FavoritesStore::load(temp_dir.path()).len(), 1);
}

#[test]
fn test_unwritable_location_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("prefs");
    // A plain file where the preferences directory should be.
    std::fs::write(&blocker, "").unwrap();

    let mut favorites = FavoritesStore::load(&blocker);
    assert!(favorites.toggle("a"));
    assert!(favorites.is_favorite("a"));

    let mut searches = SavedSearchStore::load(&blocker);
    searches.save("Anything", SavedQuery::default());
    assert_eq!(searches.list().len(), 1);
}

#[test]
fn test_saved_searches_survive_reload() {
    let temp_dir = TempDir::new().unwrap();
    let query = SavedQuery {
        search_term: "heritage".into(),
        filters: FilterState {
            locations: vec!["Cornwall".into()],
            grants_min: Some(10_000.0),
            ..FilterState::default()
        },
        sort: SortSpec::default().toggle(SortField::Grants),
    };

    let mut store = SavedSearchStore::load(temp_dir.path());
    let first = store.save("Cornish heritage", query.clone());
    let second = store.save("Everything", SavedQuery::default());
    assert_ne!(first.id, second.id);
    assert!(store.delete(&second.id));

    let reloaded = SavedSearchStore::load(temp_dir.path());
    assert_eq!(reloaded.list().len(), 1);
    let saved = reloaded.get(&first.id).unwrap();
    assert_eq!(saved.name, "Cornish heritage");
    assert_eq!(saved.query, query);
    assert_eq!(saved.created_at, first.created_at);
}
