//! Integration tests for the filter/sort engine over a realistic record set.

use std::collections::HashSet;

use funder_core::filter::apply;
use funder_core::models::record_values;
use funder_core::{
    Facet, FilterSortEngine, FilterState, Financial, Funder, SearchIndex, SortDirection,
    SortField, SortSpec,
};

fn funder(
    id: &str,
    name: &str,
    established: Option<i32>,
    grants: Option<f64>,
    locations: &[&str],
    focus: &[&str],
) -> Funder {
    let mut f = Funder::new(id, name);
    f.established = established;
    f.financial = grants.map(|g| Financial {
        grants_to_organisations: Some(g),
        ..Financial::default()
    });
    f.locations = locations.iter().map(|s| s.to_string()).collect();
    f.focus = focus.iter().map(|s| s.to_string()).collect();
    f
}

fn records() -> Vec<Funder> {
    vec![
        funder("1", "Kent Community Foundation", Some(2001), Some(4_000_000.0), &["Kent"], &["Community", "Youth"]),
        funder("2", "Welsh Arts Trust", Some(1985), Some(120_000.0), &["Wales"], &["Arts"]),
        funder("3", "London Youth Fund", Some(1990), None, &["Greater London", "Kent"], &["Youth"]),
        funder("4", "Northern Health Charity", None, Some(50_000.0), &["Yorkshire"], &["Health"]),
        funder("5", "Coastal Arts Foundation", Some(1990), Some(900_000.0), &["Kent", "Wales"], &["Arts", "Heritage"]),
        funder("6", "rural youth trust", Some(2010), Some(10_000.0), &["Wales"], &["Youth"]),
    ]
}

fn ids(view: &[&Funder]) -> Vec<String> {
    view.iter().map(|f| f.id.clone()).collect()
}

fn no_favorites() -> HashSet<String> {
    HashSet::new()
}

#[test]
fn test_refilter_is_idempotent() {
    let records = records();
    let index = SearchIndex::build(&records);
    let filters = FilterState {
        locations: vec!["Kent".into(), "Wales".into()],
        ..FilterState::default()
    };
    let sort = SortSpec::new(SortField::Grants, SortDirection::Desc);

    let run = || {
        ids(&FilterSortEngine::apply(
            &records,
            Some(&index),
            "foundation",
            &filters,
            sort,
            &no_favorites(),
            false,
        ))
    };
    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

#[test]
fn test_facets_or_within_and_across() {
    let records = records();
    let filters = FilterState {
        locations: vec!["Kent".into(), "Wales".into()],
        focus: vec!["Youth".into(), "Heritage".into()],
        ..FilterState::default()
    };
    let view = apply(&records, None, &filters, SortSpec::default(), &no_favorites(), false);

    for f in &records {
        let in_locations = record_values(f, Facet::Location)
            .iter()
            .any(|v| filters.locations.contains(v));
        let in_focus = record_values(f, Facet::Focus)
            .iter()
            .any(|v| filters.focus.contains(v));
        let shown = view.iter().any(|v| v.id == f.id);
        assert_eq!(shown, in_locations && in_focus, "record {}", f.id);
    }
    assert_eq!(ids(&view), vec!["5", "1", "3", "6"]);
}

#[test]
fn test_grants_range_treats_missing_as_zero() {
    let records = records();
    let filters = FilterState {
        grants_min: Some(50_000.0),
        grants_max: Some(900_000.0),
        ..FilterState::default()
    };
    let sort = SortSpec::new(SortField::Grants, SortDirection::Asc);
    let view = apply(&records, None, &filters, sort, &no_favorites(), false);
    assert_eq!(ids(&view), vec!["4", "2", "5"]);

    let upper_only = FilterState {
        grants_max: Some(10_000.0),
        ..FilterState::default()
    };
    let view = apply(&records, None, &upper_only, sort, &no_favorites(), false);
    assert_eq!(ids(&view), vec!["3", "6"]);
}

#[test]
fn test_stable_sort_on_equal_years() {
    let records = records();
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let sort = SortSpec::new(SortField::Established, direction);
        let view = apply(&records, None, &FilterState::default(), sort, &no_favorites(), false);
        let order = ids(&view);
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert!(pos("3") < pos("5"), "{direction:?}: {order:?}");
    }
}

#[test]
fn test_sort_established_desc_puts_unknown_last() {
    let records = records();
    let sort = SortSpec::new(SortField::Established, SortDirection::Desc);
    let view = apply(&records, None, &FilterState::default(), sort, &no_favorites(), false);
    assert_eq!(ids(&view), vec!["6", "1", "3", "5", "2", "4"]);
}

#[test]
fn test_search_then_clear_round_trip() {
    let records = records();
    let index = SearchIndex::build(&records);
    let filters = FilterState::default();

    let searched = FilterSortEngine::apply(
        &records,
        Some(&index),
        "Coastal Arts",
        &filters,
        SortSpec::default(),
        &no_favorites(),
        false,
    );
    assert!(ids(&searched).contains(&"5".to_string()));
    assert!(searched.len() < records.len());

    let cleared = FilterSortEngine::apply(
        &records,
        Some(&index),
        "",
        &filters,
        SortSpec::default(),
        &no_favorites(),
        false,
    );
    assert_eq!(cleared.len(), records.len());
}

#[test]
fn test_search_composes_with_facets_and_favorites() {
    let records = records();
    let index = SearchIndex::build(&records);
    let filters = FilterState {
        locations: vec!["Wales".into()],
        ..FilterState::default()
    };
    let favorites: HashSet<String> = ["6".to_string(), "3".to_string()].into_iter().collect();

    let view = FilterSortEngine::evaluate(
        &records,
        Some(&index),
        "youth",
        &filters,
        SortSpec::default(),
        &favorites,
        true,
    );
    assert_eq!(ids(&view.records), vec!["6"]);

    let search = view.search.unwrap();
    assert!(search.contains("1"));
    assert!(search.contains("3"));
}

#[test]
fn test_zero_results_is_not_an_error() {
    let records = records();
    let filters = FilterState {
        locations: vec!["Atlantis".into()],
        ..FilterState::default()
    };
    let view = apply(&records, None, &filters, SortSpec::default(), &no_favorites(), false);
    assert!(view.is_empty());
}

#[test]
fn test_inputs_are_not_mutated() {
    let records = records();
    let before = records.clone();
    let sort = SortSpec::new(SortField::Name, SortDirection::Desc);
    let view = apply(&records, None, &FilterState::default(), sort, &no_favorites(), false);

    assert_eq!(records, before);
    assert!(std::ptr::eq(view[0], &records[1]));
}
