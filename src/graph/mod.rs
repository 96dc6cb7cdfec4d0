//! Property graph storage.
//!
//! [`domain`] holds the persisted schema and the store contracts. Two
//! backends implement them: [`memory::InMemoryGraphStore`] and, with the
//! `with-db` feature, [`sqlite::SqliteGraphStore`].

use std::{io, path::Path};

pub mod domain;
pub mod memory;
#[cfg(feature = "with-db")]
pub mod sqlite;

pub use domain::{
    GraphSnapshot, GraphStore, GraphStoreError, GraphTransaction, NodeId, PropertyValue,
    RelationshipKind, StoredNode, StoredRelationship,
};
pub use memory::InMemoryGraphStore;
#[cfg(feature = "with-db")]
pub use sqlite::SqliteGraphStore;

/// Deletes a store directory and everything in it. A missing directory is
/// not an error.
pub fn remove_store_directory(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
