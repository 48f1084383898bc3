//! Exports of the filter/sort engine's output.
//!
//! All formatters take the already-filtered `&[&Funder]` view and never
//! touch the records themselves.

mod data;
mod labels;

pub use data::{
    escape_csv, estimate_file_size, export, export_filename, format_file_size, to_csv, to_json,
    to_jsonl, ExportFormat, ExportScope,
};
pub use labels::{
    count_with_address, layout_labels, page_count, Label, LabelPage, LabelTemplate,
};
