//! Error shared by the catalogue repository ports.

use serde_json::json;

use crate::domain::{Error, Resource};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalogue repository adapters.
    pub enum RepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
        /// A unique name or title is already taken by a known row.
        Conflict { conflicting_id: i32 } => "unique value already used by row {conflicting_id}",
        /// A unique constraint rejected the write; the clashing row is unknown.
        Duplicate { message: String } => "unique constraint violated: {message}",
        /// A referenced row does not exist.
        MissingReference { resource: String } => "{resource} not found",
    }
}

impl RepositoryError {
    /// Translate into an API error for a create on `resource`.
    pub fn into_domain(self, resource: Resource) -> Error {
        self.map(resource.duplicate_message())
    }

    /// Translate into an API error for a rename or update on `resource`.
    pub fn into_rename_error(self, resource: Resource) -> Error {
        self.map(resource.rename_conflict_message())
    }

    fn map(self, conflict_message: String) -> Error {
        match self {
            Self::Connection { .. } => Error::service_unavailable("database unavailable"),
            Self::Query { message } => Error::internal(message),
            Self::Conflict { conflicting_id } => Error::conflict(conflict_message)
                .with_details(json!({ "conflicting_id": conflicting_id })),
            Self::Duplicate { .. } => Error::conflict(conflict_message),
            Self::MissingReference { resource } => {
                Error::not_found(format!("{resource} not found"))
            }
        }
    }
}

/// Closure form of [`RepositoryError::into_domain`] for `map_err`.
pub fn repository_error(resource: Resource) -> impl Fn(RepositoryError) -> Error {
    move |err| err.into_domain(resource)
}
