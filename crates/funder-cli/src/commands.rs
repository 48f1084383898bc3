//! Subcommand handlers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use funder_core::{
    FavoritesStore, FilterSortEngine, FilterState, IngestSnapshot, OrchestratorBuilder,
    SavedSearchStore, SortSpec, UrlState,
};
use tracing::info;
use url::Url;

use crate::args::{Args, Command, GlobalArgs, OutputArgs, SavedCommand};
use crate::output;

const APP_DIR_NAME: &str = "funder-browser";

pub async fn run(args: Args) -> Result<()> {
    let Args { global, command } = args;

    match command {
        Command::Load => {
            let snapshot = load(&global, true).await?;
            println!(
                "{} funders ready ({} unparseable lines skipped, cache {})",
                snapshot.records.len(),
                snapshot.parse_errors,
                if snapshot.cache_enabled { "on" } else { "off" }
            );
        }
        Command::Search { query, output: out } => {
            let snapshot = load(&global, false).await?;
            let favorites = FavoritesStore::load(data_dir(&global)?);
            render_search(
                &snapshot,
                query.search_term(),
                &query.filters(),
                query.sort(),
                &favorites,
                &out,
            )?;
        }
        Command::Facets => {
            let snapshot = load(&global, false).await?;
            output::print_facets(&snapshot.facet_options);
        }
        Command::Favorite { id } => {
            let mut favorites = FavoritesStore::load(data_dir(&global)?);
            if favorites.toggle(&id) {
                println!("Added {} to favorites", id);
            } else {
                println!("Removed {} from favorites", id);
            }
        }
        Command::Favorites => {
            let favorites = FavoritesStore::load(data_dir(&global)?);
            for id in favorites.ids() {
                println!("{}", id);
            }
        }
        Command::Saved { command } => saved(&global, command).await?,
        Command::Share {
            query,
            base,
            funder,
        } => {
            println!("{}", query.to_url_state(funder).shareable_url(&base)?);
        }
        Command::Open { url, output: out } => {
            let url = Url::parse(&url).with_context(|| format!("Invalid link: {}", url))?;
            let state = UrlState::from_url(&url);
            let snapshot = load(&global, false).await?;
            let favorites = FavoritesStore::load(data_dir(&global)?);

            if let Some(id) = &state.funder {
                match snapshot.records.iter().find(|f| &f.id == id) {
                    Some(funder) => output::print_detail(funder),
                    None => bail!("Funder {} is not in the dataset", id),
                }
                return Ok(());
            }
            render_search(
                &snapshot,
                &state.search_term,
                &state.filters,
                state.sort,
                &favorites,
                &out,
            )?;
        }
    }

    Ok(())
}

async fn saved(global: &GlobalArgs, command: SavedCommand) -> Result<()> {
    let mut store = SavedSearchStore::load(data_dir(global)?);

    match command {
        SavedCommand::Save { name, query } => {
            let saved = store.save(name, query.to_saved_query());
            println!("Saved \"{}\" as {}", saved.name, saved.id);
        }
        SavedCommand::List => output::print_saved_searches(store.list()),
        SavedCommand::Delete { id } => {
            if !store.delete(&id) {
                bail!("No saved search with id {}", id);
            }
            println!("Deleted {}", id);
        }
        SavedCommand::Run { id, output: out } => {
            let Some(saved) = store.get(&id).cloned() else {
                bail!("No saved search with id {}", id);
            };
            let snapshot = load(global, false).await?;
            let favorites = FavoritesStore::load(data_dir(global)?);
            render_search(
                &snapshot,
                &saved.query.search_term,
                &saved.query.filters,
                saved.query.sort,
                &favorites,
                &out,
            )?;
        }
    }

    Ok(())
}

/// Directory holding the cache database and preference files.
fn data_dir(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .context("Could not determine a data directory; pass --data-dir"),
    }
}

fn is_remote(dataset: &str) -> bool {
    dataset.starts_with("http://") || dataset.starts_with("https://")
}

/// Run ingestion to completion, optionally echoing status changes.
async fn load(global: &GlobalArgs, verbose: bool) -> Result<IngestSnapshot> {
    let mut builder = OrchestratorBuilder::new().data_version(global.data_version.clone());
    builder = if is_remote(&global.dataset) {
        builder.dataset_url(global.dataset.clone())
    } else {
        builder.dataset_file(Path::new(&global.dataset))
    };
    builder = if global.no_cache {
        builder.without_cache()
    } else {
        builder.cache_dir(data_dir(global)?)
    };
    let orchestrator = builder.build()?;

    let mut rx = orchestrator.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last_status = String::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if verbose && state.status != last_status {
                match state.progress {
                    Some(p) if state.is_loading() => {
                        eprintln!("[{}] {} ({:.0}%)", state.phase, state.status, p * 100.0)
                    }
                    _ => eprintln!("[{}] {}", state.phase, state.status),
                }
                last_status = state.status;
            }
            if state.phase.is_terminal() {
                break;
            }
        }
    });

    let snapshot = orchestrator.run().await;
    // The reporter stops on its own once it sees the terminal phase.
    let _ = reporter.await;

    if let Some(error) = &snapshot.error {
        bail!("Failed to load dataset: {}", error);
    }
    info!(
        "Dataset ready with {} funders from {:?}",
        snapshot.records.len(),
        snapshot.origin
    );
    Ok(snapshot)
}

fn render_search(
    snapshot: &IngestSnapshot,
    search_term: &str,
    filters: &FilterState,
    sort: SortSpec,
    favorites: &FavoritesStore,
    out: &OutputArgs,
) -> Result<()> {
    let favorite_ids: HashSet<String> = favorites.as_set();
    let results = FilterSortEngine::apply(
        &snapshot.records,
        snapshot.index.as_deref(),
        search_term,
        filters,
        sort,
        &favorite_ids,
        out.favorites_only,
    );
    eprintln!("{} of {} funders", results.len(), snapshot.records.len());

    let shown = match out.limit {
        Some(limit) => &results[..limit.min(results.len())],
        None => &results[..],
    };
    output::print_results(shown, &favorite_ids, out)
}
