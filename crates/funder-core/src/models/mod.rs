//! Data types shared across the pipeline.

mod facets;
mod filter;
mod funder;

pub use facets::{record_values, FacetOptions};
pub use filter::{Facet, FilterState, SortDirection, SortField, SortSpec};
pub use funder::{Contact, Financial, Funder, Social};
