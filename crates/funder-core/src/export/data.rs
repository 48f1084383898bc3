//! CSV, JSON and JSONL exports of a result list.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::models::Funder;

/// Data export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Jsonl,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Jsonl => "application/x-ndjson",
            ExportFormat::Csv => "text/csv;charset=utf-8",
        }
    }

    /// Rough bytes per record, for size previews.
    fn bytes_per_record(&self) -> u64 {
        match self {
            ExportFormat::Json => 1500,
            ExportFormat::Jsonl => 1200,
            ExportFormat::Csv => 1000,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether an export holds the whole dataset or the current results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Full,
    Filtered,
}

impl ExportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::Full => "full",
            ExportScope::Filtered => "filtered",
        }
    }
}

type Accessor = fn(&Funder) -> String;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn list(values: &[String]) -> String {
    values.join("; ")
}

/// An unmodelled dataset field rendered as plain text.
fn extra(funder: &Funder, key: &str) -> String {
    fn render(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
            other => other.to_string(),
        }
    }
    funder.extra.get(key).map(render).unwrap_or_default()
}

fn extra_list(funder: &Funder, key: &str) -> String {
    match funder.extra.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

/// Every exported column, in order.
const CSV_COLUMNS: &[(&str, Accessor)] = &[
    ("id", |f| f.id.clone()),
    ("external", |f| extra(f, "external")),
    ("version", |f| extra(f, "version")),
    ("name", |f| f.name.clone()),
    ("established", |f| f.established.map(|y| y.to_string()).unwrap_or_default()),
    ("url", |f| text(&f.url)),
    ("types", |f| extra(f, "types")),
    ("applications_unsolicited", |f| {
        f.applications_unsolicited.map(|b| b.to_string()).unwrap_or_default()
    }),
    ("categories", |f| list(&f.categories)),
    ("beneficiaries", |f| list(&f.beneficiaries)),
    ("focus", |f| list(&f.focus)),
    ("locations", |f| list(&f.locations)),
    ("trustees", |f| list(&f.trustees)),
    ("tags", |f| list(&f.tags)),
    ("sources", |f| extra_list(f, "sources")),
    ("information_general", |f| text(&f.information_general)),
    ("information_beneficial_area", |f| text(&f.information_beneficial_area)),
    ("information_beneficial_sample", |f| text(&f.information_beneficial_sample)),
    ("information_exclusions", |f| text(&f.information_exclusions)),
    ("information_focus", |f| text(&f.information_focus)),
    ("information_last_updated", |f| text(&f.information_last_updated)),
    ("financial_year_end", |f| {
        f.financial.as_ref().and_then(|x| x.year_end.clone()).unwrap_or_default()
    }),
    ("financial_assets", |f| number(f.financial.as_ref().and_then(|x| x.assets))),
    ("financial_income", |f| number(f.financial.as_ref().and_then(|x| x.income))),
    ("financial_grants_to_organisations", |f| {
        number(f.financial.as_ref().and_then(|x| x.grants_to_organisations))
    }),
    ("financial_organisations_supported", |f| {
        number(f.financial.as_ref().and_then(|x| x.organisations_supported))
    }),
    ("contact_name", |f| f.contact.as_ref().map(|c| text(&c.name)).unwrap_or_default()),
    ("contact_email", |f| f.contact.as_ref().map(|c| text(&c.email)).unwrap_or_default()),
    ("contact_telephone", |f| {
        f.contact.as_ref().map(|c| text(&c.telephone)).unwrap_or_default()
    }),
    ("contact_address", |f| {
        f.contact
            .as_ref()
            .map(|c| text(&c.address).replace('\n', ", "))
            .unwrap_or_default()
    }),
    ("social_twitter", |f| f.social.as_ref().map(|s| text(&s.twitter)).unwrap_or_default()),
    ("social_facebook", |f| f.social.as_ref().map(|s| text(&s.facebook)).unwrap_or_default()),
    ("social_instagram", |f| {
        f.social.as_ref().map(|s| text(&s.instagram)).unwrap_or_default()
    }),
];

/// Quote a CSV field if it contains a comma, quote or newline.
pub fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header plus one row per funder, every field flattened.
pub fn to_csv(funders: &[&Funder]) -> String {
    let header = CSV_COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(funders.len() + 1);
    lines.push(header);
    for funder in funders {
        let row = CSV_COLUMNS
            .iter()
            .map(|(_, accessor)| escape_csv(&accessor(funder)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

/// Pretty-printed JSON array.
pub fn to_json(funders: &[&Funder]) -> Result<String> {
    Ok(serde_json::to_string_pretty(funders)?)
}

/// One compact JSON object per line, in the dataset's own format.
pub fn to_jsonl(funders: &[&Funder]) -> Result<String> {
    let lines = funders
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Render `funders` in `format`.
pub fn export(funders: &[&Funder], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(funders),
        ExportFormat::Jsonl => to_jsonl(funders),
        ExportFormat::Csv => Ok(to_csv(funders)),
    }
}

/// `funders-<scope>-<unix millis>.<ext>`
pub fn export_filename(format: ExportFormat, scope: ExportScope, timestamp: DateTime<Utc>) -> String {
    format!(
        "funders-{}-{}.{}",
        scope.as_str(),
        timestamp.timestamp_millis(),
        format.extension()
    )
}

pub fn estimate_file_size(record_count: usize, format: ExportFormat) -> u64 {
    record_count as u64 * format.bytes_per_record()
}

/// `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Financial};
    use chrono::TimeZone;

    fn sample() -> Funder {
        let mut f: Funder = serde_json::from_str(
            r#"{"id":"5f26","external":"GB-CHC-1","types":["Trust","Company"],
                "sources":["register","website"],"name":"Smith, Jones & \"Co\""}"#,
        )
        .unwrap();
        f.established = Some(1974);
        f.categories = vec!["Arts".into(), "Heritage".into()];
        f.financial = Some(Financial {
            assets: Some(95_110_000.0),
            ..Financial::default()
        });
        f.contact = Some(Contact {
            address: Some("1 High Street\nLondon".into()),
            ..Contact::default()
        });
        f
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_row() {
        let funder = sample();
        let csv = to_csv(&[&funder]);
        let mut lines = csv.lines();

        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header.len(), CSV_COLUMNS.len());
        assert_eq!(header[0], "id");
        assert_eq!(header.last(), Some(&"social_instagram"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("5f26,GB-CHC-1,,\"Smith, Jones & \"\"Co\"\"\",1974,,\"Trust,Company\",,Arts; Heritage,"));
        assert!(row.contains(",register; website,"));
        assert!(row.contains(",95110000,"));
        assert!(row.contains(",\"1 High Street, London\","));
    }

    #[test]
    fn test_jsonl_keeps_unmodelled_fields() {
        let funder = sample();
        let jsonl = to_jsonl(&[&funder, &funder]).unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["external"], "GB-CHC-1");
        assert_eq!(value["id"], "5f26");
    }

    #[test]
    fn test_json_is_pretty_array() {
        let funder = sample();
        let json = to_json(&[&funder]).unwrap();
        assert!(json.starts_with("[\n"));
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_filename_and_sizes() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            export_filename(ExportFormat::Jsonl, ExportScope::Filtered, at),
            "funders-filtered-1700000000123.jsonl"
        );
        assert_eq!(estimate_file_size(10, ExportFormat::Json), 15_000);
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.0 MB");
    }
}
