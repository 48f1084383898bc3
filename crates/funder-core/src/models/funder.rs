//! The funder record as it appears on each dataset line.

use serde::{Deserialize, Deserializer, Serialize};

/// One charitable funder.
///
/// `id` is the only required field. Every other field degrades to an empty or
/// absent value, and fields this type does not name are kept in `extra` so
/// exports reproduce the dataset line faithfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funder {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications_unsolicited: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub beneficiaries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trustees: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_general: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_beneficial_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_beneficial_sample: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_exclusions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_last_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<Financial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<Social>,

    /// Dataset fields with no dedicated slot (`external`, `version`, `types`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Most recent reported accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants_to_organisations: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisations_supported: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl Funder {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            established: None,
            url: None,
            applications_unsolicited: None,
            categories: Vec::new(),
            beneficiaries: Vec::new(),
            focus: Vec::new(),
            locations: Vec::new(),
            trustees: Vec::new(),
            tags: Vec::new(),
            information_general: None,
            information_beneficial_area: None,
            information_beneficial_sample: None,
            information_exclusions: None,
            information_focus: None,
            information_last_updated: None,
            financial: None,
            contact: None,
            social: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Establishment year, `0` when unknown.
    pub fn established_or_zero(&self) -> i32 {
        self.established.unwrap_or(0)
    }

    /// Grants to organisations, `0` when unknown.
    pub fn grants_or_zero(&self) -> f64 {
        self.financial
            .as_ref()
            .and_then(|f| f.grants_to_organisations)
            .unwrap_or(0.0)
    }

    /// Total assets, `0` when unknown.
    pub fn assets_or_zero(&self) -> f64 {
        self.financial
            .as_ref()
            .and_then(|f| f.assets)
            .unwrap_or(0.0)
    }

    /// Postal address with surrounding whitespace removed, if any remains.
    pub fn postal_address(&self) -> Option<&str> {
        self.contact
            .as_ref()
            .and_then(|c| c.address.as_deref())
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let line = r#"{"id":"5f26","established":1974,"name":"The Westminster Foundation",
            "categories":["Capital costs"],"locations":["England","Scotland"],
            "financial":{"year_end":"2018-12-31","assets":95110000,"grants_to_organisations":2660000},
            "contact":{"address":"70 Grosvenor Street\nLondon"},"external":"abc"}"#;
        let funder: Funder = serde_json::from_str(line).unwrap();

        assert_eq!(funder.id, "5f26");
        assert_eq!(funder.established, Some(1974));
        assert_eq!(funder.locations, vec!["England", "Scotland"]);
        assert_eq!(funder.assets_or_zero(), 95_110_000.0);
        assert_eq!(funder.extra.get("external").and_then(|v| v.as_str()), Some("abc"));
    }

    #[test]
    fn test_missing_and_null_fields_degrade() {
        let funder: Funder =
            serde_json::from_str(r#"{"id":"x","name":null,"focus":null}"#).unwrap();

        assert_eq!(funder.name, "");
        assert!(funder.focus.is_empty());
        assert_eq!(funder.established_or_zero(), 0);
        assert_eq!(funder.grants_or_zero(), 0.0);
        assert_eq!(funder.assets_or_zero(), 0.0);
        assert_eq!(funder.postal_address(), None);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        assert!(serde_json::from_str::<Funder>(r#"{"name":"No Id Trust"}"#).is_err());
    }

    #[test]
    fn test_blank_address_is_absent() {
        let mut funder = Funder::new("a", "A");
        funder.contact = Some(Contact {
            address: Some("   \n ".into()),
            ..Contact::default()
        });
        assert_eq!(funder.postal_address(), None);
    }
}
