//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use funder_core::{
    DatasetConfig, FilterState, LabelTemplate, SavedQuery, SortDirection, SortField, SortSpec,
    UrlState,
};

#[derive(Parser, Debug)]
#[command(name = "funder")]
#[command(about = "Search and browse the charitable funders dataset")]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug)]
pub struct GlobalArgs {
    /// Dataset location: an http(s) URL or a local NDJSON file
    #[arg(long, global = true, default_value = "funders.jsonl")]
    pub dataset: String,

    /// Directory for the record cache and preferences
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Cache version marker; a mismatch forces a fresh download
    #[arg(long, global = true, default_value = DatasetConfig::DATA_VERSION)]
    pub data_version: String,

    /// Skip the local record cache entirely
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the dataset, filling the cache if needed
    Load,

    /// Search, filter and sort funders
    Search {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the values available for each facet
    Facets,

    /// Toggle a funder in the favorites list
    Favorite {
        /// Funder id
        id: String,
    },

    /// List favorite funder ids
    Favorites,

    /// Manage saved searches
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },

    /// Print a shareable link for a search
    Share {
        #[command(flatten)]
        query: QueryArgs,

        /// Base URL of the browsing page
        #[arg(long)]
        base: String,

        /// Funder to open from the link
        #[arg(long)]
        funder: Option<String>,
    },

    /// Run the search encoded in a shared link
    Open {
        /// Link produced by `share`
        url: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SavedCommand {
    /// Save a search under a name
    Save {
        /// Display name
        name: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// List saved searches
    List,

    /// Delete a saved search
    Delete {
        /// Saved search id
        id: String,
    },

    /// Run a saved search
    Run {
        /// Saved search id
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Search term, filters and sort order.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Free-text search over names, descriptions and categories
    pub query: Option<String>,

    /// Location to include (repeatable)
    #[arg(long = "location")]
    pub locations: Vec<String>,

    /// Beneficiary group to include (repeatable)
    #[arg(long = "beneficiary")]
    pub beneficiaries: Vec<String>,

    /// Focus area to include (repeatable)
    #[arg(long)]
    pub focus: Vec<String>,

    /// Category to include (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long)]
    pub grants_min: Option<f64>,

    #[arg(long)]
    pub grants_max: Option<f64>,

    #[arg(long)]
    pub assets_min: Option<f64>,

    #[arg(long)]
    pub assets_max: Option<f64>,

    #[arg(long)]
    pub established_min: Option<i32>,

    #[arg(long)]
    pub established_max: Option<i32>,

    /// Require (true) or exclude (false) funders open to unsolicited applications
    #[arg(long)]
    pub unsolicited: Option<bool>,

    /// Sort field
    #[arg(long, default_value = "name")]
    pub sort: SortField,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl QueryArgs {
    pub fn search_term(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }

    pub fn filters(&self) -> FilterState {
        FilterState {
            locations: self.locations.clone(),
            beneficiaries: self.beneficiaries.clone(),
            focus: self.focus.clone(),
            categories: self.categories.clone(),
            grants_min: self.grants_min,
            grants_max: self.grants_max,
            assets_min: self.assets_min,
            assets_max: self.assets_max,
            established_min: self.established_min,
            established_max: self.established_max,
            applications_unsolicited: self.unsolicited,
        }
    }

    pub fn sort(&self) -> SortSpec {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        SortSpec::new(self.sort, direction)
    }

    pub fn to_saved_query(&self) -> SavedQuery {
        SavedQuery {
            search_term: self.search_term().to_string(),
            filters: self.filters(),
            sort: self.sort(),
        }
    }

    pub fn to_url_state(&self, funder: Option<String>) -> UrlState {
        UrlState {
            search_term: self.search_term().to_string(),
            filters: self.filters(),
            sort: self.sort(),
            funder,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
    Jsonl,
    Labels,
}

/// How results are rendered.
#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Maximum rows to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only show favorites
    #[arg(long)]
    pub favorites_only: bool,

    /// Write csv/json/jsonl exports into this directory instead of stdout
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Label sheet for `--format labels`
    #[arg(long, default_value = LabelTemplate::DEFAULT_ID)]
    pub template: String,

    /// Put the contact name on labels
    #[arg(long)]
    pub contact_names: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_filters() {
        let args = Args::try_parse_from([
            "funder",
            "search",
            "youth arts",
            "--location",
            "Kent",
            "--location",
            "Wales",
            "--grants-min",
            "5000",
            "--sort",
            "grants",
            "--desc",
            "--format",
            "csv",
        ])
        .unwrap();

        let Command::Search { query, output } = args.command else {
            panic!("expected search");
        };
        assert_eq!(query.search_term(), "youth arts");
        assert_eq!(query.filters().locations, vec!["Kent", "Wales"]);
        assert_eq!(query.filters().grants_min, Some(5000.0));
        assert_eq!(query.sort(), SortSpec::new(SortField::Grants, SortDirection::Desc));
        assert_eq!(output.format, OutputFormat::Csv);
        assert_eq!(output.template, "L7160");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["funder", "facets", "--no-cache", "--data-version", "2.0"])
                .unwrap();
        assert!(args.global.no_cache);
        assert_eq!(args.global.data_version, "2.0");
        assert_eq!(args.global.dataset, "funders.jsonl");
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        assert!(Args::try_parse_from(["funder", "search", "--sort", "popularity"]).is_err());
    }

    #[test]
    fn test_saved_save_takes_name_then_query() {
        let args = Args::try_parse_from([
            "funder",
            "saved",
            "save",
            "Kent youth",
            "youth",
            "--location",
            "Kent",
        ])
        .unwrap();
        let Command::Saved {
            command: SavedCommand::Save { name, query },
        } = args.command
        else {
            panic!("expected saved save");
        };
        assert_eq!(name, "Kent youth");
        let saved = query.to_saved_query();
        assert_eq!(saved.search_term, "youth");
        assert_eq!(saved.filters.locations, vec!["Kent"]);
        assert!(saved.sort.is_default());
    }
}
