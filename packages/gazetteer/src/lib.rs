#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only gazetteer lookups for toponym resolution.
//!
//! The resolution core consumes a gazetteer through the [`Gazetteer`]
//! trait: lookup by id, candidate generation by phrase, and administrative
//! ancestor lookup. This crate also provides:
//!
//! - [`LevelTables`]: the immutable code/id tables used to classify a
//!   record's [`Level`] and to resolve its administrative ancestors. Built
//!   once at startup and shared read-only.
//! - [`InMemoryGazetteer`]: a [`Gazetteer`] backed by a `GeoNames` dump
//!   loaded into memory.

pub mod dump;
pub mod memory;
pub mod tables;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use geotag_gazetteer_models::{EARTH_ID, GazetteerEntry, Level, earth};
pub use memory::InMemoryGazetteer;
pub use tables::LevelTables;

use thiserror::Error;

/// Ancestor records of an entry, keyed by their level.
pub type Hierarchy = BTreeMap<Level, Arc<GazetteerEntry>>;

/// Errors from gazetteer loading and lookups.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A file was readable but its content was not.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// File being parsed.
        file: String,
        /// Description of the parsing failure.
        message: String,
    },

    /// The backing store could not answer the lookup.
    #[error("Gazetteer unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to a gazetteer.
///
/// A record that does not exist is `Ok(None)` / an empty list, never an
/// error. Errors are reserved for the store itself failing.
pub trait Gazetteer: Send + Sync {
    /// Loads a single record by its `GeoNames` id.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the store cannot be queried.
    fn lookup_by_id(&self, id: u64) -> Result<Option<Arc<GazetteerEntry>>, GazetteerError>;

    /// Loads the candidate records for a phrase, case-insensitively, in the
    /// store's ranking order.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the store cannot be queried.
    fn lookup_by_phrase(&self, phrase: &str) -> Result<Vec<Arc<GazetteerEntry>>, GazetteerError>;

    /// Resolves the known administrative ancestors of `entry`. Levels that
    /// cannot be resolved are absent; the entry itself is never included.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the store cannot be queried.
    fn ancestor_hierarchy(&self, entry: &GazetteerEntry) -> Result<Hierarchy, GazetteerError>;
}
