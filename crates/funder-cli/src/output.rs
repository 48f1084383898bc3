//! Terminal rendering of results, facets and saved searches.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use funder_core::export::{
    estimate_file_size, export, export_filename, format_file_size, layout_labels, page_count,
};
use funder_core::format::{format_compact_amount, format_currency, format_month_year, MISSING};
use funder_core::{
    ExportFormat, ExportScope, Facet, FacetOptions, Funder, LabelTemplate, SavedSearch,
};

use crate::args::{OutputArgs, OutputFormat};

const NAME_WIDTH: usize = 40;
const LOCATION_WIDTH: usize = 24;

pub fn print_results(
    funders: &[&Funder],
    favorites: &HashSet<String>,
    out: &OutputArgs,
) -> Result<()> {
    match out.format {
        OutputFormat::Table => {
            print_table(funders, favorites);
            Ok(())
        }
        OutputFormat::Labels => print_labels(funders, out),
        OutputFormat::Csv => write_export(funders, ExportFormat::Csv, out.out_dir.as_deref()),
        OutputFormat::Json => write_export(funders, ExportFormat::Json, out.out_dir.as_deref()),
        OutputFormat::Jsonl => write_export(funders, ExportFormat::Jsonl, out.out_dir.as_deref()),
    }
}

/// Cut to `width` characters, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn print_table(funders: &[&Funder], favorites: &HashSet<String>) {
    println!(
        "  {:<12} {:<name$} {:<loc$} {:>5} {:>9} {:>9}",
        "ID",
        "NAME",
        "LOCATIONS",
        "EST.",
        "GRANTS",
        "ASSETS",
        name = NAME_WIDTH,
        loc = LOCATION_WIDTH,
    );
    for funder in funders {
        let star = if favorites.contains(&funder.id) { '*' } else { ' ' };
        let established = funder
            .established
            .map(|year| year.to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let financial = funder.financial.as_ref();
        println!(
            "{} {:<12} {:<name$} {:<loc$} {:>5} {:>9} {:>9}",
            star,
            truncate(&funder.id, 12),
            truncate(&funder.name, NAME_WIDTH),
            truncate(&funder.locations.join(", "), LOCATION_WIDTH),
            established,
            format_compact_amount(financial.and_then(|f| f.grants_to_organisations)),
            format_compact_amount(financial.and_then(|f| f.assets)),
            name = NAME_WIDTH,
            loc = LOCATION_WIDTH,
        );
    }
}

fn write_export(funders: &[&Funder], format: ExportFormat, out_dir: Option<&Path>) -> Result<()> {
    let body = export(funders, format)?;
    let Some(dir) = out_dir else {
        print!("{}", body);
        return Ok(());
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(export_filename(format, ExportScope::Filtered, Utc::now()));
    std::fs::write(&path, &body).with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} funders to {} ({}, estimated {})",
        funders.len(),
        path.display(),
        format_file_size(body.len() as u64),
        format_file_size(estimate_file_size(funders.len(), format)),
    );
    Ok(())
}

fn print_labels(funders: &[&Funder], out: &OutputArgs) -> Result<()> {
    let Some(template) = LabelTemplate::find(&out.template) else {
        let known: Vec<&str> = LabelTemplate::ALL.iter().map(|t| t.id).collect();
        bail!(
            "Unknown label template {} (expected one of {})",
            out.template,
            known.join(", ")
        );
    };

    let pages = layout_labels(funders, &template, out.contact_names);
    let labels: usize = pages.iter().map(|p| p.labels.len()).sum();
    eprintln!(
        "{} labels on {} sheet(s) of {}",
        labels,
        page_count(labels, &template),
        template.name
    );

    for (number, page) in pages.iter().enumerate() {
        println!("=== Sheet {} ===", number + 1);
        for label in &page.labels {
            println!(
                "[row {}, col {} @ {:.1}mm, {:.1}mm] {}",
                label.row + 1,
                label.column + 1,
                label.x,
                label.y,
                label.funder_id
            );
            for line in &label.lines {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}

pub fn print_facets(options: &FacetOptions) {
    for facet in Facet::ALL {
        let values = options.get(facet);
        println!("{} ({}):", facet, values.len());
        for value in values {
            println!("  {}", value);
        }
    }
}

pub fn print_detail(funder: &Funder) {
    println!("{} [{}]", funder.name, funder.id);
    if let Some(url) = &funder.url {
        println!("  Website:      {}", url);
    }
    if let Some(year) = funder.established {
        println!("  Established:  {}", year);
    }
    if let Some(financial) = &funder.financial {
        println!(
            "  Accounts:     {} (grants {}, assets {}, income {})",
            format_month_year(financial.year_end.as_deref()),
            format_currency(financial.grants_to_organisations),
            format_currency(financial.assets),
            format_currency(financial.income),
        );
    }
    for (label, values) in [
        ("Locations", &funder.locations),
        ("Focus", &funder.focus),
        ("Beneficiaries", &funder.beneficiaries),
        ("Categories", &funder.categories),
    ] {
        if !values.is_empty() {
            println!("  {:<13} {}", format!("{}:", label), values.join(", "));
        }
    }
    if let Some(address) = funder.postal_address() {
        println!("  Address:      {}", address.lines().collect::<Vec<_>>().join(", "));
    }
    if let Some(general) = &funder.information_general {
        println!();
        println!("{}", general.trim());
    }
}

pub fn print_saved_searches(searches: &[SavedSearch]) {
    if searches.is_empty() {
        println!("No saved searches");
        return;
    }
    for saved in searches {
        let query = &saved.query;
        let term = if query.search_term.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", query.search_term)
        };
        println!(
            "{}  {}  {}{} ({} filters, sort {} {})",
            saved.id,
            saved.created_at.format("%Y-%m-%d %H:%M"),
            saved.name,
            term,
            query.filters.active_facet_count(),
            query.sort.field,
            query.sort.direction.as_str(),
        );
    }
}
