//! Weighted multi-field fuzzy index over the funder records.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashSet};
use std::time::Instant;
use tracing::debug;

use super::distance::{bounded_osa, typo_budget};
use super::tokens::{query_terms, tokenize, Token};
use crate::config::SearchConfig;
use crate::models::Funder;

/// Record attributes covered by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    InformationGeneral,
    Focus,
    Beneficiaries,
    Categories,
    Locations,
}

impl SearchField {
    pub const ALL: [SearchField; 6] = [
        SearchField::Name,
        SearchField::InformationGeneral,
        SearchField::Focus,
        SearchField::Beneficiaries,
        SearchField::Categories,
        SearchField::Locations,
    ];

    /// Ranking weight of a match in this field.
    pub fn weight(&self) -> f64 {
        match self {
            SearchField::Name => SearchConfig::NAME_WEIGHT,
            SearchField::InformationGeneral => SearchConfig::INFORMATION_WEIGHT,
            SearchField::Focus => SearchConfig::FOCUS_WEIGHT,
            SearchField::Beneficiaries => SearchConfig::BENEFICIARIES_WEIGHT,
            SearchField::Categories => SearchConfig::CATEGORIES_WEIGHT,
            SearchField::Locations => SearchConfig::LOCATIONS_WEIGHT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::InformationGeneral => "information_general",
            SearchField::Focus => "focus",
            SearchField::Beneficiaries => "beneficiaries",
            SearchField::Categories => "categories",
            SearchField::Locations => "locations",
        }
    }

    /// The field's text on `funder`, one entry per list element.
    fn values(self, funder: &Funder) -> Vec<(Option<usize>, &str)> {
        match self {
            SearchField::Name => vec![(None, funder.name.as_str())],
            SearchField::InformationGeneral => funder
                .information_general
                .as_deref()
                .map(|text| vec![(None, text)])
                .unwrap_or_default(),
            SearchField::Focus => list_values(&funder.focus),
            SearchField::Beneficiaries => list_values(&funder.beneficiaries),
            SearchField::Categories => list_values(&funder.categories),
            SearchField::Locations => list_values(&funder.locations),
        }
    }
}

fn list_values(items: &[String]) -> Vec<(Option<usize>, &str)> {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| (Some(i), s.as_str()))
        .collect()
}

/// How a query term met an indexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
    Fuzzy { typos: usize },
}

impl MatchKind {
    pub fn typos(&self) -> usize {
        match self {
            MatchKind::Fuzzy { typos } => *typos,
            _ => 0,
        }
    }

    /// Multiplier applied to the field weight.
    pub fn quality(&self) -> f64 {
        match self {
            MatchKind::Exact => 1.0,
            MatchKind::Prefix => 0.9,
            MatchKind::Substring => 0.7,
            MatchKind::Fuzzy { typos } => 0.5 / (*typos as f64),
        }
    }
}

/// Half-open range of char offsets, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// Matched character ranges within one field of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: SearchField,
    /// Position within the list for list-valued fields.
    pub element: Option<usize>,
    /// Sorted, non-overlapping ranges.
    pub ranges: Vec<MatchRange>,
}

/// One matching record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    /// Position of the record in the indexed slice.
    pub position: usize,
    pub score: f64,
    pub typos: usize,
    pub matches: Vec<FieldMatch>,
}

/// Ranked hits for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    hits: Vec<SearchHit>,
    total_matches: usize,
}

impl SearchResults {
    /// Hits, best first.
    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Matching records before the limit was applied.
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn id_set(&self) -> HashSet<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hits.iter().any(|hit| hit.id == id)
    }

    /// Highlight metadata for one record.
    pub fn matches_for(&self, id: &str) -> Option<&[FieldMatch]> {
        self.hits
            .iter()
            .find(|hit| hit.id == id)
            .map(|hit| hit.matches.as_slice())
    }
}

#[derive(Debug)]
struct IndexedText {
    field: SearchField,
    element: Option<usize>,
    tokens: Vec<Token>,
}

#[derive(Debug)]
struct IndexedRecord {
    id: String,
    texts: Vec<IndexedText>,
}

/// Search index over a fixed record set.
///
/// There is no incremental update: a changed record set needs a new index.
#[derive(Debug, Default)]
pub struct SearchIndex {
    records: Vec<IndexedRecord>,
}

/// Heap entry ordered so that the worst hit is the greatest.
struct RankedHit(SearchHit);

impl Ord for RankedHit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .typos
            .cmp(&other.0.typos)
            .then_with(|| other.0.score.total_cmp(&self.0.score))
            .then_with(|| self.0.position.cmp(&other.0.position))
    }
}

impl PartialOrd for RankedHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedHit {}

impl SearchIndex {
    /// Tokenize every indexed field of every record.
    pub fn build(funders: &[Funder]) -> Self {
        let started = Instant::now();
        let records: Vec<IndexedRecord> = funders
            .iter()
            .map(|funder| IndexedRecord {
                id: funder.id.clone(),
                texts: SearchField::ALL
                    .iter()
                    .flat_map(|field| {
                        field
                            .values(funder)
                            .into_iter()
                            .map(move |(element, text)| IndexedText {
                                field: *field,
                                element,
                                tokens: tokenize(text),
                            })
                    })
                    .filter(|text| !text.tokens.is_empty())
                    .collect(),
            })
            .collect();

        debug!(
            "Built search index over {} records in {:?}",
            records.len(),
            started.elapsed()
        );
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run `query` and keep the best `limit` hits.
    ///
    /// Returns `None` for a query without any searchable characters; callers
    /// treat that as "no search filter".
    ///
    /// Terms match at token starts. Only terms of at least
    /// [`SearchConfig::MIN_SUBSTRING_LEN`] characters also match inside a
    /// token, so `"a t"` finds "Alpha Trust" but not "Zeta Trust".
    pub fn search(&self, query: &str, limit: usize) -> Option<SearchResults> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return None;
        }

        let mut heap: BinaryHeap<RankedHit> = BinaryHeap::new();
        let mut total_matches = 0;

        for (position, record) in self.records.iter().enumerate() {
            let Some(hit) = score_record(record, position, &terms) else {
                continue;
            };
            total_matches += 1;

            let entry = RankedHit(hit);
            if heap.len() < limit {
                heap.push(entry);
            } else if let Some(mut worst) = heap.peek_mut() {
                if entry < *worst {
                    *worst = entry;
                }
            }
        }

        let hits: Vec<SearchHit> = heap.into_sorted_vec().into_iter().map(|r| r.0).collect();
        debug!(
            "Search {:?}: {} matches, {} returned",
            query,
            total_matches,
            hits.len()
        );

        Some(SearchResults {
            hits,
            total_matches,
        })
    }
}

/// Best way `term` meets `token`, with the matched span relative to the token.
fn match_token(term: &[char], token: &Token) -> Option<(MatchKind, usize, usize)> {
    let chars = token.chars.as_slice();

    if chars == term {
        return Some((MatchKind::Exact, 0, term.len()));
    }
    if chars.starts_with(term) {
        return Some((MatchKind::Prefix, 0, term.len()));
    }
    if term.len() >= SearchConfig::MIN_SUBSTRING_LEN && term.len() < chars.len() {
        if let Some(offset) = chars.windows(term.len()).position(|w| w == term) {
            return Some((MatchKind::Substring, offset, term.len()));
        }
    }

    let budget = typo_budget(term.len());
    if budget == 0 {
        return None;
    }

    let whole = bounded_osa(term, chars, budget).map(|typos| (typos, chars.len()));
    let prefix = if chars.len() > term.len() {
        bounded_osa(term, &chars[..term.len()], budget).map(|typos| (typos, term.len()))
    } else {
        None
    };

    let (typos, span) = match (whole, prefix) {
        (Some(w), Some(p)) => {
            if p.0 < w.0 {
                p
            } else {
                w
            }
        }
        (Some(w), None) => w,
        (None, Some(p)) => p,
        (None, None) => return None,
    };
    Some((MatchKind::Fuzzy { typos }, 0, span))
}

fn score_record(record: &IndexedRecord, position: usize, terms: &[Vec<char>]) -> Option<SearchHit> {
    let mut typos = 0;
    let mut score = 0.0;
    let mut spans: BTreeMap<(SearchField, Option<usize>), Vec<MatchRange>> = BTreeMap::new();

    for term in terms {
        let mut term_typos: Option<usize> = None;
        let mut field_best: BTreeMap<SearchField, f64> = BTreeMap::new();

        for text in &record.texts {
            for token in &text.tokens {
                let Some((kind, offset, len)) = match_token(term, token) else {
                    continue;
                };
                let start = token.start + offset;
                spans
                    .entry((text.field, text.element))
                    .or_default()
                    .push(MatchRange {
                        start,
                        end: start + len,
                    });

                term_typos = Some(term_typos.map_or(kind.typos(), |t| t.min(kind.typos())));
                let quality = kind.quality() * text.field.weight();
                let best = field_best.entry(text.field).or_insert(0.0);
                if quality > *best {
                    *best = quality;
                }
            }
        }

        // Every term must match somewhere.
        typos += term_typos?;
        score += field_best.values().sum::<f64>();
    }

    let matches = spans
        .into_iter()
        .map(|((field, element), ranges)| FieldMatch {
            field,
            element,
            ranges: merge_ranges(ranges),
        })
        .collect();

    Some(SearchHit {
        id: record.id.clone(),
        position,
        score,
        typos,
        matches,
    })
}

fn merge_ranges(mut ranges: Vec<MatchRange>) -> Vec<MatchRange> {
    ranges.sort();
    let mut merged: Vec<MatchRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
