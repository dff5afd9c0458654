//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the bibliographic source) are implemented by
//! outbound adapters. Driving ports (account and enrichment services) are
//! called by inbound adapters and implemented by domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod author_repository;
mod bibliographic_source;
mod book_repository;
mod catalogue_maintenance;
mod collection_repository;
mod enrichment_service;
mod repository_error;
mod stats_query;
mod taxonomy_repository;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use author_repository::AuthorRepository;
#[cfg(test)]
pub use author_repository::MockAuthorRepository;
#[cfg(test)]
pub use bibliographic_source::MockBibliographicSource;
pub use bibliographic_source::{
    AuthorMatch, BibliographicSource, BibliographicSourceError, EditionSummary, WorkDetails,
    WorkQuery, WorkSummary,
};
pub use book_repository::BookRepository;
#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use catalogue_maintenance::CatalogueMaintenance;
#[cfg(test)]
pub use catalogue_maintenance::MockCatalogueMaintenance;
pub use collection_repository::CollectionRepository;
#[cfg(test)]
pub use collection_repository::MockCollectionRepository;
pub use enrichment_service::EnrichmentService;
#[cfg(test)]
pub use enrichment_service::MockEnrichmentService;
pub use repository_error::{RepositoryError, repository_error};
#[cfg(test)]
pub use stats_query::MockStatsQuery;
pub use stats_query::StatsQuery;
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::TaxonomyRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
