//! Fuzzy full-text search over the resident record set.
//!
//! The index is token based. Query text and indexed text are lowercased and
//! split on non-alphanumeric characters; a record matches when every query
//! term meets some token in some indexed field, either exactly, as a prefix,
//! inside the token, or within a small edit distance. Hits are ranked by total
//! typos, then by weighted field score, so an exact match always beats a
//! fuzzy one.

mod distance;
mod highlight;
mod index;
mod tokens;

pub use distance::{bounded_osa, typo_budget};
pub use highlight::{highlight_segments, substring_ranges, Segment};
pub use index::{
    FieldMatch, MatchKind, MatchRange, SearchField, SearchHit, SearchIndex, SearchResults,
};
pub use tokens::{query_terms, tokenize, Token};
