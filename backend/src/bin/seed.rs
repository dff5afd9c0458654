//! Reset the catalogue and fill it with demo accounts, Open Library books and
//! collections.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use bookshelf::domain::{CatalogueSeeder, SeedPlan};
use bookshelf::outbound::open_library::{DEFAULT_BASE_URL, OpenLibraryHttpSource};
use bookshelf::outbound::persistence::{
    DbPool, DieselBookRepository, DieselCatalogueMaintenance, DieselCollectionRepository,
    DieselUserRepository, PoolConfig, run_pending_migrations,
};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `bookshelf-seed` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bookshelf-seed",
    about = "Wipe the catalogue and seed demo users, books and collections",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Books to collect before stopping.
    #[arg(long, default_value_t = 100)]
    target: usize,
    /// Works requested per subject.
    #[arg(long = "per-subject", default_value_t = 8)]
    per_subject: u32,
    /// Subject slug to walk; repeat to replace the built-in list.
    #[arg(long = "subject", value_name = "slug")]
    subjects: Vec<String>,
    /// RNG seed for years and collection contents.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Open Library API root.
    #[arg(long = "open-library-url", default_value = DEFAULT_BASE_URL)]
    open_library_url: Url,
    /// Skip applying migrations first.
    #[arg(long = "skip-migrations")]
    skip_migrations: bool,
}

impl CliArgs {
    fn plan(&self) -> SeedPlan {
        let defaults = SeedPlan::default();
        SeedPlan {
            subjects: if self.subjects.is_empty() {
                defaults.subjects
            } else {
                self.subjects.clone()
            },
            works_per_subject: self.per_subject,
            target_books: self.target,
        }
    }
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
    if !args.skip_migrations {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("failed to apply migrations")?;
    }
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let source = OpenLibraryHttpSource::new(args.open_library_url.clone(), Duration::from_secs(15))
        .wrap_err("failed to build Open Library client")?;

    let seeder = CatalogueSeeder::new(
        Arc::new(DieselCatalogueMaintenance::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselBookRepository::new(pool.clone())),
        Arc::new(DieselCollectionRepository::new(pool)),
        Arc::new(source),
    );
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let report = seeder
        .run(&args.plan(), &mut rng)
        .await
        .map_err(|error| eyre!("seeding failed: {error}"))?;

    println!("users={}", report.users);
    println!("books={}", report.books);
    println!("duplicates={}", report.duplicates);
    println!("errors={}", report.errors);
    println!("collections={}", report.collections);
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
