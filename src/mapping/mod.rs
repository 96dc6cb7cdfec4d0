//! Mapping of a reasoned class hierarchy into the property graph.
//!
//! A pass is driven by [`orchestrator::GraphMappingOrchestrator`]: for every
//! class it derives a node key ([`names`]), gets or creates the node
//! ([`registry`]), writes its label properties ([`annotations`]) and its
//! hierarchy edges ([`hierarchy`]). All nodes of one ontology share the
//! category picked by [`classifier`].

use thiserror::Error;

use crate::{
    graph::domain::GraphStoreError,
    ontology::{repositories::ReasonerError, value_objects::Iri},
};

pub mod annotations;
pub mod classifier;
pub mod hierarchy;
pub mod names;
pub mod orchestrator;
pub mod registry;

pub use annotations::{AlternativeTermProperties, AnnotationExtractor, ClassAnnotations};
pub use classifier::{Category, CategoryRule, LabelClassifier};
pub use hierarchy::{HierarchyResolver, RepresentativePolicy};
pub use names::{FragmentKeyResolver, KeyStrategy, LocalNameResolver, NameResolver};
pub use orchestrator::{
    GraphMappingOrchestrator, MappingContext, MappingReport, MappingState, MappingStats,
};
pub use registry::NodeRegistry;

/// Faults that abort the mapping of one ontology without ending the run.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The reasoner found no model for the ontology.
    #[error("ontology is inconsistent")]
    Inconsistent,

    #[error(transparent)]
    Reasoner(#[from] ReasonerError),

    #[error(transparent)]
    Store(#[from] GraphStoreError),

    /// An annotation expected to carry text points at an IRI instead.
    #[error("annotation `{property}` on class `{class}` is not a literal")]
    NonLiteralAnnotation { class: Iri, property: Iri },
}
