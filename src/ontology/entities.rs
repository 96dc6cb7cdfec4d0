use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::value_objects::Iri;

/// Value carried by an annotation assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    /// Lexical form of a literal, language tag and datatype dropped.
    Literal(String),
    /// Annotation pointing at another entity.
    Iri(Iri),
}

impl AnnotationValue {
    /// Returns the literal text, or `None` for IRI values.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::Iri(_) => None,
        }
    }
}

/// An annotation assertion attached to a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    property: Iri,
    value: AnnotationValue,
}

impl Annotation {
    #[must_use]
    pub fn new(property: Iri, value: AnnotationValue) -> Self {
        Self { property, value }
    }

    /// Shorthand for a literal-valued annotation.
    #[must_use]
    pub fn literal(property: Iri, text: impl Into<String>) -> Self {
        Self::new(property, AnnotationValue::Literal(text.into()))
    }

    #[must_use]
    pub fn property(&self) -> &Iri {
        &self.property
    }

    #[must_use]
    pub fn value(&self) -> &AnnotationValue {
        &self.value
    }
}

/// Ontology class definition capturing told axioms and annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    id: Iri,
    annotations: Vec<Annotation>,
    super_classes: BTreeSet<Iri>,
    equivalent_classes: BTreeSet<Iri>,
    disjoint_classes: BTreeSet<Iri>,
}

impl Class {
    /// Creates a new [`Class`] with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            annotations: Vec::new(),
            super_classes: BTreeSet::new(),
            equivalent_classes: BTreeSet::new(),
            disjoint_classes: BTreeSet::new(),
        }
    }

    /// Appends an annotation, keeping assertion order.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotate(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Adds a told `rdfs:subClassOf` parent.
    pub fn add_parent(&mut self, parent: Iri) -> bool {
        self.super_classes.insert(parent)
    }

    /// Records a told `owl:equivalentClass` partner.
    pub fn add_equivalent(&mut self, other: Iri) -> bool {
        self.equivalent_classes.insert(other)
    }

    /// Records a told `owl:disjointWith` partner.
    pub fn add_disjoint(&mut self, other: Iri) -> bool {
        self.disjoint_classes.insert(other)
    }

    /// Returns the unique identifier of the class.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Annotations in the order they were asserted.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the told parent classes in lexical order.
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<Iri> {
        &self.super_classes
    }

    #[must_use]
    pub fn equivalents(&self) -> &BTreeSet<Iri> {
        &self.equivalent_classes
    }

    #[must_use]
    pub fn disjoints(&self) -> &BTreeSet<Iri> {
        &self.disjoint_classes
    }
}

/// Annotation property declaration with its told super-properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationProperty {
    id: Iri,
    super_properties: BTreeSet<Iri>,
}

impl AnnotationProperty {
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            super_properties: BTreeSet::new(),
        }
    }

    /// Declares this property an `rdfs:subPropertyOf` the given one.
    pub fn add_super_property(&mut self, parent: Iri) -> bool {
        self.super_properties.insert(parent)
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn super_properties(&self) -> &BTreeSet<Iri> {
        &self.super_properties
    }
}

/// An ontology individual with its asserted class memberships.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Individual {
    id: Iri,
    types: BTreeSet<Iri>,
}

impl Individual {
    /// Creates a new individual with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            types: BTreeSet::new(),
        }
    }

    /// Declares that the individual is an instance of the given class.
    pub fn assert_type(&mut self, class: Iri) -> bool {
        self.types.insert(class)
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn types(&self) -> &BTreeSet<Iri> {
        &self.types
    }
}

/// Aggregates the classes, annotation properties and individuals of one
/// ontology document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ontology {
    id: Option<Iri>,
    classes: BTreeMap<Iri, Class>,
    annotation_properties: BTreeMap<Iri, AnnotationProperty>,
    individuals: BTreeMap<Iri, Individual>,
}

impl Ontology {
    /// Creates an empty, anonymous ontology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: Iri) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds a class to the ontology, enforcing unique identifiers.
    pub fn add_class(&mut self, class: Class) -> Result<(), OntologyError> {
        let id = class.id().clone();
        if self.classes.contains_key(&id) {
            return Err(OntologyError::DuplicateClass(id));
        }
        self.classes.insert(id, class);
        Ok(())
    }

    /// Returns the class with the given identifier, declaring it first if needed.
    pub fn declare_class(&mut self, id: Iri) -> &mut Class {
        self.classes
            .entry(id)
            .or_insert_with_key(|id| Class::new(id.clone()))
    }

    /// Adds an annotation property, enforcing unique identifiers.
    pub fn add_annotation_property(
        &mut self,
        property: AnnotationProperty,
    ) -> Result<(), OntologyError> {
        let id = property.id().clone();
        if self.annotation_properties.contains_key(&id) {
            return Err(OntologyError::DuplicateAnnotationProperty(id));
        }
        self.annotation_properties.insert(id, property);
        Ok(())
    }

    /// Returns the annotation property with the given identifier, declaring it first if needed.
    pub fn declare_annotation_property(&mut self, id: Iri) -> &mut AnnotationProperty {
        self.annotation_properties
            .entry(id)
            .or_insert_with_key(|id| AnnotationProperty::new(id.clone()))
    }

    /// Adds an individual ensuring it only references known classes.
    pub fn add_individual(&mut self, individual: Individual) -> Result<(), OntologyError> {
        let id = individual.id().clone();
        if self.individuals.contains_key(&id) {
            return Err(OntologyError::DuplicateIndividual(id));
        }
        if let Some(class) = individual
            .types()
            .iter()
            .find(|class| !self.classes.contains_key(*class))
        {
            return Err(OntologyError::MissingClass {
                individual: id,
                class: class.clone(),
            });
        }
        self.individuals.insert(id, individual);
        Ok(())
    }

    /// Returns the ontology identifier, if the document declared one.
    #[must_use]
    pub fn id(&self) -> Option<&Iri> {
        self.id.as_ref()
    }

    #[must_use]
    pub fn class(&self, id: &Iri) -> Option<&Class> {
        self.classes.get(id)
    }

    #[must_use]
    pub fn annotation_property(&self, id: &Iri) -> Option<&AnnotationProperty> {
        self.annotation_properties.get(id)
    }

    /// Returns all classes ordered by identifier.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<Iri, Class> {
        &self.classes
    }

    #[must_use]
    pub fn annotation_properties(&self) -> &BTreeMap<Iri, AnnotationProperty> {
        &self.annotation_properties
    }

    #[must_use]
    pub fn individuals(&self) -> &BTreeMap<Iri, Individual> {
        &self.individuals
    }
}

/// Errors raised when manipulating an ontology aggregate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OntologyError {
    /// Attempted to add a class with an existing identifier.
    #[error("class `{0}` already exists")]
    DuplicateClass(Iri),
    /// Attempted to add an annotation property with an existing identifier.
    #[error("annotation property `{0}` already exists")]
    DuplicateAnnotationProperty(Iri),
    /// Attempted to add an individual with an existing identifier.
    #[error("individual `{0}` already exists")]
    DuplicateIndividual(Iri),
    /// An individual was typed with a class the ontology does not declare.
    #[error("individual `{individual}` references unknown class `{class}`")]
    MissingClass { individual: Iri, class: Iri },
}
