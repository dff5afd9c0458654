//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Validation and wording live in the
//!   domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **One transaction per write**: Book writes and collection membership
//!   replacement delete and reinsert junction rows atomically.
//! - **Strongly typed errors**: All database errors are mapped to
//!   [`RepositoryError`](crate::domain::ports::RepositoryError).
//!
//! # Example
//!
//! ```ignore
//! use bookshelf::outbound::persistence::{DbPool, PoolConfig, DieselBookRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/bookshelf");
//! let pool = DbPool::new(config).await?;
//! let books = DieselBookRepository::new(pool);
//! ```

mod diesel_author_repository;
mod diesel_book_repository;
mod diesel_catalogue_maintenance;
mod diesel_collection_repository;
pub(crate) mod diesel_helpers;
mod diesel_relation_sync;
mod diesel_stats_query;
mod diesel_taxonomy_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_author_repository::DieselAuthorRepository;
pub use diesel_book_repository::DieselBookRepository;
pub use diesel_catalogue_maintenance::DieselCatalogueMaintenance;
pub use diesel_collection_repository::DieselCollectionRepository;
pub use diesel_stats_query::DieselStatsQuery;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
