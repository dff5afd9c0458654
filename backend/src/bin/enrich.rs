//! Run Open Library enrichment sweeps against the catalogue from the shell.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use bookshelf::domain::ports::EnrichmentService;
use bookshelf::domain::{CoverUrls, OpenLibraryEnrichment};
use bookshelf::outbound::open_library::{DEFAULT_BASE_URL, OpenLibraryHttpSource};
use bookshelf::outbound::persistence::{
    DbPool, DieselAuthorRepository, DieselBookRepository, PoolConfig,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `bookshelf-enrich` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bookshelf-enrich",
    about = "Fill in covers and author portraits, or import books, from Open Library",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    /// Open Library API root.
    #[arg(long = "open-library-url", default_value = DEFAULT_BASE_URL, global = true)]
    open_library_url: Url,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = 10, global = true)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Look up cover ids for books that have none.
    Covers,
    /// Look up portraits for authors that have none.
    AuthorImages,
    /// Search Open Library and insert results not yet catalogued.
    Import {
        /// Free-text search.
        #[arg(long)]
        query: String,
        /// Maximum results to consider.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|error| eyre!("tracing init failed: {error}"))?;

    let args = CliArgs::parse();
    let database_url = resolve_database_url(args.database_url.clone())?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let source = OpenLibraryHttpSource::new(
        args.open_library_url.clone(),
        Duration::from_secs(args.timeout_secs),
    )
    .wrap_err("failed to build Open Library client")?;
    let service = OpenLibraryEnrichment::new(
        Arc::new(DieselBookRepository::new(pool.clone())),
        Arc::new(DieselAuthorRepository::new(pool)),
        Arc::new(source),
        CoverUrls::default(),
    );

    run(&service, &args.command).await
}

async fn run(service: &dyn EnrichmentService, command: &Command) -> Result<()> {
    match command {
        Command::Covers => {
            let report = service
                .backfill_cover_ids()
                .await
                .map_err(|error| eyre!("cover backfill failed: {error}"))?;
            print_json(&report)
        }
        Command::AuthorImages => {
            let report = service
                .backfill_author_images()
                .await
                .map_err(|error| eyre!("author image backfill failed: {error}"))?;
            print_json(&report)
        }
        Command::Import { query, limit } => {
            let report = service
                .import_from_search(query, *limit)
                .await
                .map_err(|error| eyre!("import failed: {error}"))?;
            print_json(&report)
        }
    }
}

fn print_json<T: serde::Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).wrap_err("failed to encode report")?;
    println!("{json}");
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    let url = match explicit {
        Some(value) => value,
        None => env::var("DATABASE_URL")
            .map_err(|_| eyre!("database URL missing: set --database-url or DATABASE_URL"))?,
    };
    if url.trim().is_empty() {
        return Err(eyre!("database URL must not be empty"));
    }
    Ok(url)
}
