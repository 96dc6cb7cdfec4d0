//! Ontology domain: the parsed aggregate, the read contracts the mapping pass
//! consumes, a document loader and the built-in reasoner.
//!
//! Only named classes take part in the mapping. `owl:Thing` and
//! `owl:Nothing` never appear in a class signature.

pub mod entities;
pub mod loader;
pub mod reasoner;
pub mod repositories;
pub mod value_objects;
pub mod vocab;

pub use entities::{
    Annotation, AnnotationProperty, AnnotationValue, Class, Individual, Ontology, OntologyError,
};
pub use loader::{OntologyLoadError, OntologyLoader};
pub use reasoner::StructuralReasoner;
pub use repositories::{EquivalenceGroup, OntologySource, ReasonerError, ReasoningOracle};
pub use value_objects::{Iri, IriError};
