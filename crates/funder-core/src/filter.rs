//! The filter/sort engine.
//!
//! Everything here is a pure function of its inputs: records are borrowed,
//! never cloned or mutated, and the output is a fresh ordered view. Stages run
//! in a fixed order (favorites, search, facets, ranges, flag, sort); each one
//! only narrows the candidate list, and the final stable sort only reorders
//! it.

use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::models::{record_values, Facet, FilterState, Funder, SortDirection, SortField, SortSpec};
use crate::search::{SearchIndex, SearchResults};

/// Filter and sort `records`.
///
/// `search_matches` of `None` means no text search is active. The favorites
/// restriction applies only when `favorites_only` is set and `favorites` is
/// non-empty.
pub fn apply<'a>(
    records: &'a [Funder],
    search_matches: Option<&HashSet<&str>>,
    filters: &FilterState,
    sort: SortSpec,
    favorites: &HashSet<String>,
    favorites_only: bool,
) -> Vec<&'a Funder> {
    let restrict_favorites = favorites_only && !favorites.is_empty();

    let mut view: Vec<&Funder> = records
        .iter()
        .filter(|f| !restrict_favorites || favorites.contains(f.id.as_str()))
        .filter(|f| search_matches.map_or(true, |ids| ids.contains(f.id.as_str())))
        .filter(|f| passes_facets(f, filters))
        .filter(|f| passes_ranges(f, filters))
        .filter(|f| passes_flag(f, filters))
        .collect();

    sort_view(&mut view, sort);
    view
}

/// A record passes when it shares a value with every facet that has a
/// selection.
pub fn passes_facets(funder: &Funder, filters: &FilterState) -> bool {
    Facet::ALL.iter().all(|facet| {
        let selected = filters.facet(*facet);
        selected.is_empty()
            || record_values(funder, *facet)
                .iter()
                .any(|value| selected.contains(value))
    })
}

/// Inclusive range checks; missing numbers count as zero.
pub fn passes_ranges(funder: &Funder, filters: &FilterState) -> bool {
    fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
        min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
    }

    within(funder.grants_or_zero(), filters.grants_min, filters.grants_max)
        && within(funder.assets_or_zero(), filters.assets_min, filters.assets_max)
        && within(
            funder.established_or_zero(),
            filters.established_min,
            filters.established_max,
        )
}

pub fn passes_flag(funder: &Funder, filters: &FilterState) -> bool {
    filters
        .applications_unsolicited
        .map_or(true, |wanted| funder.applications_unsolicited.unwrap_or(false) == wanted)
}

/// Stable sort; equal keys keep their relative order in both directions.
pub fn sort_view(view: &mut [&Funder], sort: SortSpec) {
    match (sort.field, sort.direction) {
        (SortField::Name, SortDirection::Asc) => {
            view.sort_by_cached_key(|f| f.name.to_lowercase());
        }
        (SortField::Name, SortDirection::Desc) => {
            view.sort_by_cached_key(|f| Reverse(f.name.to_lowercase()));
        }
        (SortField::Established, direction) => {
            view.sort_by(|a, b| {
                directed(a.established_or_zero().cmp(&b.established_or_zero()), direction)
            });
        }
        (SortField::Grants, direction) => {
            view.sort_by(|a, b| {
                directed(a.grants_or_zero().total_cmp(&b.grants_or_zero()), direction)
            });
        }
        (SortField::Assets, direction) => {
            view.sort_by(|a, b| {
                directed(a.assets_or_zero().total_cmp(&b.assets_or_zero()), direction)
            });
        }
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Result of one engine pass, keeping the search hits for highlighting.
#[derive(Debug)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a Funder>,
    /// `None` when no search term was given.
    pub search: Option<SearchResults>,
}

/// Entry point used by presentation layers: search, then filter and sort.
pub struct FilterSortEngine;

impl FilterSortEngine {
    /// Ordered records for the current UI state.
    ///
    /// A blank `search_term` or a missing index bypasses text search.
    pub fn apply<'a>(
        records: &'a [Funder],
        index: Option<&SearchIndex>,
        search_term: &str,
        filters: &FilterState,
        sort: SortSpec,
        favorites: &HashSet<String>,
        favorites_only: bool,
    ) -> Vec<&'a Funder> {
        Self::evaluate(
            records,
            index,
            search_term,
            filters,
            sort,
            favorites,
            favorites_only,
        )
        .records
    }

    /// Like [`FilterSortEngine::apply`], also returning the search hits.
    pub fn evaluate<'a>(
        records: &'a [Funder],
        index: Option<&SearchIndex>,
        search_term: &str,
        filters: &FilterState,
        sort: SortSpec,
        favorites: &HashSet<String>,
        favorites_only: bool,
    ) -> FilteredView<'a> {
        let search = match index {
            Some(index) if !search_term.trim().is_empty() => {
                index.search(search_term, SearchConfig::DEFAULT_LIMIT)
            }
            _ => None,
        };

        let ids = search.as_ref().map(|results| results.id_set());
        let records = apply(
            records,
            ids.as_ref(),
            filters,
            sort,
            favorites,
            favorites_only,
        );

        FilteredView { records, search }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Financial;

    fn funder(id: &str, name: &str, established: Option<i32>, assets: Option<f64>) -> Funder {
        let mut f = Funder::new(id, name);
        f.established = established;
        f.financial = assets.map(|assets| Financial {
            assets: Some(assets),
            ..Financial::default()
        });
        f
    }

    fn ids(view: &[&Funder]) -> Vec<String> {
        view.iter().map(|f| f.id.clone()).collect()
    }

    fn pair() -> Vec<Funder> {
        vec![
            funder("a", "Zeta Trust", Some(1990), Some(500.0)),
            funder("b", "Alpha Fund", Some(1990), Some(1000.0)),
        ]
    }

    fn run(records: &[Funder], filters: &FilterState, sort: SortSpec) -> Vec<String> {
        ids(&apply(records, None, filters, sort, &HashSet::new(), false))
    }

    #[test]
    fn test_sort_by_name() {
        let records = pair();
        let sort = SortSpec::new(SortField::Name, SortDirection::Asc);
        assert_eq!(run(&records, &FilterState::default(), sort), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_by_established_is_stable() {
        let records = pair();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sort = SortSpec::new(SortField::Established, direction);
            assert_eq!(run(&records, &FilterState::default(), sort), vec!["a", "b"]);
        }
    }

    #[test]
    fn test_assets_min() {
        let records = pair();
        let filters = FilterState {
            assets_min: Some(600.0),
            ..FilterState::default()
        };
        assert_eq!(run(&records, &filters, SortSpec::default()), vec!["b"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let records = vec![
            funder("1", "beta", None, None),
            funder("2", "Alpha", None, None),
            funder("3", "alpha", None, None),
        ];
        assert_eq!(
            run(&records, &FilterState::default(), SortSpec::default()),
            vec!["2", "3", "1"]
        );
        let desc = SortSpec::new(SortField::Name, SortDirection::Desc);
        assert_eq!(run(&records, &FilterState::default(), desc), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let records = vec![funder("x", "X", Some(2000), None)];
        let filters = FilterState {
            established_min: Some(2000),
            established_max: Some(2000),
            ..FilterState::default()
        };
        assert_eq!(run(&records, &filters, SortSpec::default()), vec!["x"]);
    }

    #[test]
    fn test_missing_numbers_count_as_zero() {
        let records = vec![funder("x", "X", None, None)];
        let positive_min = FilterState {
            assets_min: Some(1.0),
            ..FilterState::default()
        };
        assert!(run(&records, &positive_min, SortSpec::default()).is_empty());

        let max_only = FilterState {
            grants_max: Some(0.0),
            established_max: Some(1900),
            ..FilterState::default()
        };
        assert_eq!(run(&records, &max_only, SortSpec::default()), vec!["x"]);
    }

    #[test]
    fn test_unsolicited_flag() {
        let mut yes = Funder::new("yes", "Yes");
        yes.applications_unsolicited = Some(true);
        let mut no = Funder::new("no", "No");
        no.applications_unsolicited = Some(false);
        let unknown = Funder::new("unknown", "Unknown");
        let records = vec![yes, no, unknown];

        let wanted = |flag| FilterState {
            applications_unsolicited: Some(flag),
            ..FilterState::default()
        };
        assert_eq!(run(&records, &wanted(true), SortSpec::default()), vec!["yes"]);
        assert_eq!(
            run(&records, &wanted(false), SortSpec::default()),
            vec!["no", "unknown"]
        );
    }

    #[test]
    fn test_empty_favorites_restrict_nothing() {
        let records = pair();
        let none = HashSet::new();
        let view = apply(&records, None, &FilterState::default(), SortSpec::default(), &none, true);
        assert_eq!(view.len(), 2);

        let favorites: HashSet<String> = ["a".to_string()].into_iter().collect();
        let view = apply(&records, None, &FilterState::default(), SortSpec::default(), &favorites, true);
        assert_eq!(ids(&view), vec!["a"]);

        let view = apply(&records, None, &FilterState::default(), SortSpec::default(), &favorites, false);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_engine_bypasses_index_for_blank_term() {
        let records = pair();
        let index = SearchIndex::build(&records);
        let favorites = HashSet::new();
        let filters = FilterState::default();

        let view = FilterSortEngine::evaluate(
            &records,
            Some(&index),
            "   ",
            &filters,
            SortSpec::default(),
            &favorites,
            false,
        );
        assert!(view.search.is_none());
        assert_eq!(view.records.len(), 2);

        let view = FilterSortEngine::evaluate(
            &records,
            Some(&index),
            "zeta",
            &filters,
            SortSpec::default(),
            &favorites,
            false,
        );
        assert_eq!(ids(&view.records), vec!["a"]);
        assert!(view.search.unwrap().contains("a"));
    }
}
