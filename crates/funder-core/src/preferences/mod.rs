//! User-local preferences: favorites and saved searches.
//!
//! Both live in small JSON files next to the cache. They are independent of
//! the dataset version and never block the data pipeline.

mod atomic;
mod favorites;
mod saved_searches;

pub use atomic::{read_json, write_json};
pub use favorites::FavoritesStore;
pub use saved_searches::{SavedQuery, SavedSearch, SavedSearchStore};
