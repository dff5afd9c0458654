//! Open Library outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `BibliographicSource` port.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_BASE_URL, OpenLibraryHttpSource};
