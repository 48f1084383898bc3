//! Search state as URL query parameters, for bookmarking and sharing.
//!
//! Multi-select facets repeat their key (`location=Kent&location=Wales`).
//! Empty values are left out, as is the sort pair when it is the default
//! (name ascending). Values that do not parse are ignored so a hand-edited
//! link still opens.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::error::{FunderError, Result};
use crate::models::{Facet, FilterState, SortDirection, SortField, SortSpec};

const KEY_QUERY: &str = "q";
const KEY_SORT: &str = "sort";
const KEY_DIRECTION: &str = "dir";
const KEY_FUNDER: &str = "funder";
const KEY_UNSOLICITED: &str = "unsolicited";

/// Everything the URL can carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlState {
    pub search_term: String,
    pub filters: FilterState,
    pub sort: SortSpec,
    /// Funder to open directly.
    pub funder: Option<String>,
}

impl UrlState {
    /// Encode as a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());

        let term = self.search_term.trim();
        if !term.is_empty() {
            query.append_pair(KEY_QUERY, term);
        }
        for facet in Facet::ALL {
            for value in self.filters.facet(facet) {
                if !value.is_empty() {
                    query.append_pair(facet.as_str(), value);
                }
            }
        }

        let f = &self.filters;
        let numbers = [
            ("grants_min", f.grants_min),
            ("grants_max", f.grants_max),
            ("assets_min", f.assets_min),
            ("assets_max", f.assets_max),
            ("established_min", f.established_min.map(f64::from)),
            ("established_max", f.established_max.map(f64::from)),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                query.append_pair(key, &value.to_string());
            }
        }
        if let Some(flag) = f.applications_unsolicited {
            query.append_pair(KEY_UNSOLICITED, if flag { "true" } else { "false" });
        }

        if !self.sort.is_default() {
            query.append_pair(KEY_SORT, self.sort.field.as_str());
            query.append_pair(KEY_DIRECTION, self.sort.direction.as_str());
        }
        if let Some(id) = self.funder.as_deref().filter(|id| !id.is_empty()) {
            query.append_pair(KEY_FUNDER, id);
        }

        query.finish()
    }

    /// Decode a query string, with or without the leading `?`.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let f = &mut state.filters;
            match key.as_ref() {
                KEY_QUERY => state.search_term = value.to_string(),
                KEY_FUNDER => state.funder = Some(value.to_string()),
                KEY_SORT => {
                    if let Ok(field) = value.parse::<SortField>() {
                        state.sort.field = field;
                    }
                }
                KEY_DIRECTION => {
                    if let Ok(direction) = value.parse::<SortDirection>() {
                        state.sort.direction = direction;
                    }
                }
                KEY_UNSOLICITED => f.applications_unsolicited = value.parse().ok(),
                "grants_min" => f.grants_min = parse_number(value),
                "grants_max" => f.grants_max = parse_number(value),
                "assets_min" => f.assets_min = parse_number(value),
                "assets_max" => f.assets_max = parse_number(value),
                "established_min" => f.established_min = value.parse().ok(),
                "established_max" => f.established_max = value.parse().ok(),
                other => {
                    let facet = Facet::ALL
                        .into_iter()
                        .find(|candidate| candidate.as_str() == other);
                    if let Some(facet) = facet {
                        let selected = f.facet_mut(facet);
                        if !selected.iter().any(|v| v == value) {
                            selected.push(value.to_string());
                        }
                    }
                }
            }
        }

        state
    }

    /// Read the state from a full URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_query_string(url.query().unwrap_or(""))
    }

    /// `base` with its query replaced by this state.
    pub fn shareable_url(&self, base: &str) -> Result<String> {
        let mut url = Url::parse(base).map_err(|e| FunderError::Validation {
            field: "base_url".to_string(),
            message: format!("{}: {}", base, e),
        })?;
        let query = self.to_query_string();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url.to_string())
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}
