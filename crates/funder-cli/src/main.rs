//! Funder CLI - terminal front end for the funders dataset.
//!
//! Loads the dataset through the same ingestion pipeline a browser client
//! would use (cache first, streaming download otherwise) and exposes search,
//! facets, favorites, saved searches and shareable links as subcommands.

mod args;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so command output can be piped
    let log_level = if args.global.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!("Running {:?}", args.command);

    commands::run(args).await
}
