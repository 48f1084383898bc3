//! Facet option lists derived from the full record set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::filter::Facet;
use super::funder::Funder;

/// Unique, sorted values available for each facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub locations: Vec<String>,
    pub beneficiaries: Vec<String>,
    pub focus: Vec<String>,
    pub categories: Vec<String>,
}

impl FacetOptions {
    /// Collect the option lists in a single pass over `funders`.
    pub fn from_funders(funders: &[Funder]) -> Self {
        let mut locations = BTreeSet::new();
        let mut beneficiaries = BTreeSet::new();
        let mut focus = BTreeSet::new();
        let mut categories = BTreeSet::new();

        for funder in funders {
            locations.extend(funder.locations.iter().map(String::as_str));
            beneficiaries.extend(funder.beneficiaries.iter().map(String::as_str));
            focus.extend(funder.focus.iter().map(String::as_str));
            categories.extend(funder.categories.iter().map(String::as_str));
        }

        let owned = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect();
        Self {
            locations: owned(locations),
            beneficiaries: owned(beneficiaries),
            focus: owned(focus),
            categories: owned(categories),
        }
    }

    pub fn get(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Location => &self.locations,
            Facet::Beneficiary => &self.beneficiaries,
            Facet::Focus => &self.focus,
            Facet::Category => &self.categories,
        }
    }
}

/// Values of `facet` carried by one record.
pub fn record_values(funder: &Funder, facet: Facet) -> &[String] {
    match facet {
        Facet::Location => &funder.locations,
        Facet::Beneficiary => &funder.beneficiaries,
        Facet::Focus => &funder.focus,
        Facet::Category => &funder.categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sorted_options() {
        let mut a = Funder::new("a", "A");
        a.locations = vec!["Wales".into(), "England".into()];
        a.focus = vec!["Arts".into()];
        let mut b = Funder::new("b", "B");
        b.locations = vec!["England".into(), "Cornwall".into()];

        let options = FacetOptions::from_funders(&[a, b]);
        assert_eq!(options.locations, vec!["Cornwall", "England", "Wales"]);
        assert_eq!(options.get(Facet::Focus), ["Arts".to_string()]);
        assert!(options.categories.is_empty());
    }
}
