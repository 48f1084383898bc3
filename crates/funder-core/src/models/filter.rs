//! Filter and sort state driving the filter/sort engine.
//!
//! These are plain values: the URL layer, saved searches and the CLI all
//! serialize them as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A categorical filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Location,
    Beneficiary,
    Focus,
    Category,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Location,
        Facet::Beneficiary,
        Facet::Focus,
        Facet::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Location => "location",
            Facet::Beneficiary => "beneficiary",
            Facet::Focus => "focus",
            Facet::Category => "category",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every user-selectable filter.
///
/// Facet selections are OR'd within a facet and AND'd across facets. Range
/// bounds are inclusive; a `None` bound is unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub locations: Vec<String>,
    pub beneficiaries: Vec<String>,
    pub focus: Vec<String>,
    pub categories: Vec<String>,
    pub grants_min: Option<f64>,
    pub grants_max: Option<f64>,
    pub assets_min: Option<f64>,
    pub assets_max: Option<f64>,
    pub established_min: Option<i32>,
    pub established_max: Option<i32>,
    /// When set, the record's flag must equal this value (missing counts as `false`).
    pub applications_unsolicited: Option<bool>,
}

impl FilterState {
    /// Selected values for one facet.
    pub fn facet(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Location => &self.locations,
            Facet::Beneficiary => &self.beneficiaries,
            Facet::Focus => &self.focus,
            Facet::Category => &self.categories,
        }
    }

    pub fn facet_mut(&mut self, facet: Facet) -> &mut Vec<String> {
        match facet {
            Facet::Location => &mut self.locations,
            Facet::Beneficiary => &mut self.beneficiaries,
            Facet::Focus => &mut self.focus,
            Facet::Category => &mut self.categories,
        }
    }

    /// Number of facets with at least one selected value.
    pub fn active_facet_count(&self) -> usize {
        Facet::ALL
            .iter()
            .filter(|facet| !self.facet(**facet).is_empty())
            .count()
    }

    pub fn has_range_filters(&self) -> bool {
        self.grants_min.is_some()
            || self.grants_max.is_some()
            || self.assets_min.is_some()
            || self.assets_max.is_some()
            || self.established_min.is_some()
            || self.established_max.is_some()
    }

    /// True when nothing would be filtered out.
    pub fn is_empty(&self) -> bool {
        self.active_facet_count() == 0
            && !self.has_range_filters()
            && self.applications_unsolicited.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Sortable record attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Established,
    Grants,
    Assets,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Established => "established",
            SortField::Grants => "grants",
            SortField::Assets => "assets",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "established" => Ok(SortField::Established),
            "grants" => Ok(SortField::Grants),
            "assets" => Ok(SortField::Assets),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// Sort field plus direction. Defaults to name ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Sort-button behaviour: clicking the active field flips direction,
    /// clicking another field starts ascending for names and descending for
    /// numbers.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else if field == SortField::Name {
            Self::new(field, SortDirection::Asc)
        } else {
            Self::new(field, SortDirection::Desc)
        }
    }
}
