//! Display formatting for money and dates.

use chrono::NaiveDate;

/// Placeholder for a value the dataset does not provide.
pub const MISSING: &str = "—";

/// Abbreviated pounds: `£1.2M`, `£500K`, `£42`.
pub fn format_compact_amount(amount: Option<f64>) -> String {
    match amount {
        None => MISSING.to_string(),
        Some(n) if n >= 1_000_000.0 => format!("£{:.1}M", n / 1_000_000.0),
        Some(n) if n >= 1_000.0 => format!("£{:.0}K", n / 1_000.0),
        Some(n) => format!("£{}", n),
    }
}

/// Whole pounds with thousands separators: `£1,234,567`.
pub fn format_currency(amount: Option<f64>) -> String {
    let Some(amount) = amount else {
        return MISSING.to_string();
    };
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}£{}", sign, grouped)
}

/// `2018-12-31` as `Dec 2018`. Unparseable dates are shown as given.
pub fn format_month_year(date: Option<&str>) -> String {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => MISSING.to_string(),
        Some(raw) => {
            let day = raw.get(..10).unwrap_or(raw);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|_| raw.to_string())
        }
    }
}
