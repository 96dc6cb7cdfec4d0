use std::collections::BTreeSet;

use thiserror::Error;

use super::entities::{Annotation, Ontology};
use super::value_objects::Iri;

/// Read access to a parsed ontology, as consumed by the mapping pass.
pub trait OntologySource {
    /// Returns every named class in the ontology signature.
    ///
    /// Callers must not rely on the iteration order.
    fn classes_in_signature(&self) -> Vec<Iri>;

    /// Returns every annotation property in the ontology signature.
    fn annotation_properties_in_signature(&self) -> Vec<Iri>;

    /// Returns the annotations asserted on `class` for `property`, in source order.
    fn annotations(&self, class: &Iri, property: &Iri) -> Vec<Annotation>;

    /// Returns the declared direct sub-properties of an annotation property.
    fn sub_properties(&self, property: &Iri) -> Vec<Iri>;

    /// Renders the qualified identifier of a class (`<iri>`).
    fn qualified_identifier(&self, class: &Iri) -> String {
        class.qualified()
    }
}

impl OntologySource for Ontology {
    fn classes_in_signature(&self) -> Vec<Iri> {
        self.classes().keys().cloned().collect()
    }

    fn annotation_properties_in_signature(&self) -> Vec<Iri> {
        self.annotation_properties().keys().cloned().collect()
    }

    fn annotations(&self, class: &Iri, property: &Iri) -> Vec<Annotation> {
        self.class(class)
            .map(|class| {
                class
                    .annotations()
                    .iter()
                    .filter(|annotation| annotation.property() == property)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sub_properties(&self, property: &Iri) -> Vec<Iri> {
        self.annotation_properties()
            .values()
            .filter(|candidate| candidate.super_properties().contains(property))
            .map(|candidate| candidate.id().clone())
            .collect()
    }
}

/// A set of classes the reasoner considers equivalent, reported as one
/// hierarchy position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquivalenceGroup {
    representative: Iri,
    members: BTreeSet<Iri>,
}

impl EquivalenceGroup {
    /// Builds a group whose representative is the one the reasoner picked.
    #[must_use]
    pub fn new(representative: Iri, others: impl IntoIterator<Item = Iri>) -> Self {
        let mut members: BTreeSet<Iri> = others.into_iter().collect();
        members.insert(representative.clone());
        Self {
            representative,
            members,
        }
    }

    /// Group with a single member.
    #[must_use]
    pub fn single(class: Iri) -> Self {
        Self::new(class, [])
    }

    /// The member chosen by the reasoner.
    #[must_use]
    pub fn representative(&self) -> &Iri {
        &self.representative
    }

    /// The lexicographically smallest member, independent of reasoner choice.
    #[must_use]
    pub fn canonical(&self) -> &Iri {
        self.members.first().unwrap_or(&self.representative)
    }

    #[must_use]
    pub fn members(&self) -> &BTreeSet<Iri> {
        &self.members
    }
}

/// Consistency checking and superclass computation over an ontology.
pub trait ReasoningOracle {
    /// Returns `false` when the ontology has no model.
    fn is_consistent(&self) -> Result<bool, ReasonerError>;

    /// Returns the directly inferred superclasses of `class`, grouped by
    /// equivalence. An empty result means the class sits directly below
    /// `owl:Thing`.
    fn direct_superclasses(&self, class: &Iri) -> Result<Vec<EquivalenceGroup>, ReasonerError>;
}

/// Errors raised by [`ReasoningOracle`] implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReasonerError {
    /// The queried class is not part of the ontology signature.
    #[error("class `{0}` is not in the ontology signature")]
    UnknownClass(Iri),
    /// Backend specific failure.
    #[error("reasoner failure: {0}")]
    Backend(String),
}
