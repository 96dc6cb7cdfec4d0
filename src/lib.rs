//! Maps the reasoned class hierarchy of OWL ontologies into a property graph.
//!
//! Every named class becomes a node keyed by a name derived from its IRI.
//! Classes without a direct superclass hang from a single `owl:Thing` root
//! through `isA`, all others point at their direct superclasses through
//! `partOf`. Nodes carry the class labels and alternative terms and are
//! tagged with a category picked from the ontology file name.

pub use self::errors::Error;

pub mod boot;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logger;
pub mod mapping;
pub mod ontology;

#[cfg(all(feature = "cli", feature = "with-db"))]
pub mod cli;

/// Application results options list
pub type Result<T, E = Error> = std::result::Result<T, E>;
