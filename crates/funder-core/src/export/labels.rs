//! Mailing-label layout on A4 Avery sheets.
//!
//! Only funders with a non-blank postal address get a label. Layout produces
//! positioned text blocks; turning them into a PDF is left to the caller.

use serde::Serialize;

use crate::models::Funder;

/// An A4 label sheet. Dimensions are in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub cols: usize,
    pub rows: usize,
    pub label_width: f64,
    pub label_height: f64,
    pub margin_top: f64,
    pub margin_left: f64,
    pub gap_x: f64,
    pub gap_y: f64,
}

impl LabelTemplate {
    pub const DEFAULT_ID: &'static str = "L7160";

    pub const ALL: [LabelTemplate; 5] = [
        LabelTemplate {
            id: "L7159",
            name: "Avery L7159 (24 per sheet)",
            cols: 3,
            rows: 8,
            label_width: 63.5,
            label_height: 33.9,
            margin_top: 12.9,
            margin_left: 6.5,
            gap_x: 2.5,
            gap_y: 0.0,
        },
        LabelTemplate {
            id: "L7160",
            name: "Avery L7160 (21 per sheet)",
            cols: 3,
            rows: 7,
            label_width: 63.5,
            label_height: 38.1,
            margin_top: 15.1,
            margin_left: 7.2,
            gap_x: 2.5,
            gap_y: 0.0,
        },
        LabelTemplate {
            id: "L7161",
            name: "Avery L7161 (18 per sheet)",
            cols: 3,
            rows: 6,
            label_width: 63.5,
            label_height: 46.6,
            margin_top: 8.8,
            margin_left: 7.2,
            gap_x: 2.5,
            gap_y: 0.0,
        },
        LabelTemplate {
            id: "L7162",
            name: "Avery L7162 (16 per sheet)",
            cols: 2,
            rows: 8,
            label_width: 99.1,
            label_height: 33.9,
            margin_top: 12.9,
            margin_left: 4.7,
            gap_x: 2.5,
            gap_y: 0.0,
        },
        LabelTemplate {
            id: "L7163",
            name: "Avery L7163 (14 per sheet)",
            cols: 2,
            rows: 7,
            label_width: 99.1,
            label_height: 38.1,
            margin_top: 15.1,
            margin_left: 4.7,
            gap_x: 2.5,
            gap_y: 0.0,
        },
    ];

    /// Template by id, case-insensitive.
    pub fn find(id: &str) -> Option<LabelTemplate> {
        Self::ALL
            .into_iter()
            .find(|t| t.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn labels_per_page(&self) -> usize {
        self.cols * self.rows
    }
}

impl Default for LabelTemplate {
    fn default() -> Self {
        Self::ALL[1]
    }
}

/// One positioned label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub funder_id: String,
    pub column: usize,
    pub row: usize,
    /// Top-left corner on the page, in millimetres.
    pub x: f64,
    pub y: f64,
    /// Name, optional contact name, then address lines.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelPage {
    pub labels: Vec<Label>,
}

/// Funders that would get a label.
pub fn count_with_address(funders: &[&Funder]) -> usize {
    funders.iter().filter(|f| f.postal_address().is_some()).count()
}

/// Sheets needed for `label_count` labels.
pub fn page_count(label_count: usize, template: &LabelTemplate) -> usize {
    label_count.div_ceil(template.labels_per_page().max(1))
}

fn label_lines(funder: &Funder, address: &str, include_contact_name: bool) -> Vec<String> {
    let mut lines = vec![funder.name.trim().to_string()];
    if include_contact_name {
        if let Some(name) = funder
            .contact
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            lines.push(name.to_string());
        }
    }
    lines.extend(
        address
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    );
    lines
}

/// Lay labels out row by row, starting a new page when one fills.
pub fn layout_labels(
    funders: &[&Funder],
    template: &LabelTemplate,
    include_contact_name: bool,
) -> Vec<LabelPage> {
    let per_page = template.labels_per_page().max(1);
    let mut pages: Vec<LabelPage> = Vec::new();

    let addressed = funders
        .iter()
        .filter_map(|f| f.postal_address().map(|address| (*f, address)));
    for (i, (funder, address)) in addressed.enumerate() {
        let position = i % per_page;
        if position == 0 {
            pages.push(LabelPage::default());
        }
        let column = position % template.cols;
        let row = position / template.cols;

        let label = Label {
            funder_id: funder.id.clone(),
            column,
            row,
            x: template.margin_left + column as f64 * (template.label_width + template.gap_x),
            y: template.margin_top + row as f64 * (template.label_height + template.gap_y),
            lines: label_lines(funder, address, include_contact_name),
        };
        if let Some(page) = pages.last_mut() {
            page.labels.push(label);
        }
    }

    pages
}
