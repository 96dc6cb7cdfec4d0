use tracing::{debug, info};

use super::MappingError;
use crate::{
    config::AnnotationConfig,
    ontology::{
        entities::Annotation, repositories::OntologySource, value_objects::Iri, vocab,
    },
};

/// Annotation properties whose literals become alternative names, resolved
/// once per ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlternativeTermProperties {
    properties: Vec<Iri>,
    preferred_display_name: String,
}

impl AlternativeTermProperties {
    /// Locates the designated alternative-term property (case-insensitive IRI
    /// match) and its declared sub-properties, followed by any configured
    /// extra synonym properties the ontology declares.
    ///
    /// A missing designated property leaves it and its sub-properties out;
    /// that is not an error.
    pub fn resolve<O>(ontology: &O, config: &AnnotationConfig) -> Self
    where
        O: OntologySource + ?Sized,
    {
        let signature = ontology.annotation_properties_in_signature();
        let mut properties: Vec<Iri> = Vec::new();

        match signature
            .iter()
            .find(|property| property.eq_ignore_case(&config.alternative_term))
        {
            Some(designated) => {
                properties.push(designated.clone());
                properties.extend(ontology.sub_properties(designated));
                info!(
                    property = %designated,
                    count = properties.len(),
                    "alternative_term_properties_resolved"
                );
            }
            None => {
                info!(
                    property = %config.alternative_term,
                    "alternative_term_property_not_in_ontology"
                );
            }
        }

        for extra in &config.extra_synonyms {
            if let Some(found) = signature.iter().find(|property| property.eq_ignore_case(extra)) {
                if !properties.contains(found) {
                    properties.push(found.clone());
                }
            }
        }

        Self {
            properties,
            preferred_display_name: config.preferred_display_name.clone(),
        }
    }

    /// Builds a set from explicit parts.
    #[must_use]
    pub fn new(properties: Vec<Iri>, preferred_display_name: impl Into<String>) -> Self {
        Self {
            properties,
            preferred_display_name: preferred_display_name.into(),
        }
    }

    #[must_use]
    pub fn properties(&self) -> &[Iri] {
        &self.properties
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn overrides_display_name(&self, property: &Iri) -> bool {
        property.as_str() == self.preferred_display_name
    }
}

/// Label values derived for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassAnnotations {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub alternative_names: Vec<String>,
}

/// Resolves the label, display name and alternative names of a class.
pub struct AnnotationExtractor<'a> {
    label: Iri,
    alternative_terms: &'a AlternativeTermProperties,
}

impl<'a> AnnotationExtractor<'a> {
    #[must_use]
    pub fn new(alternative_terms: &'a AlternativeTermProperties) -> Self {
        Self {
            label: Iri::known(vocab::RDFS_LABEL),
            alternative_terms,
        }
    }

    /// `rdfs:label` fills `name` and `displayName`, the last one seen winning.
    /// Every alternative-term literal is appended to the alternative names in
    /// property order; literals of the preferred display name property also
    /// replace `displayName`.
    pub fn extract<O>(&self, ontology: &O, class: &Iri) -> Result<ClassAnnotations, MappingError>
    where
        O: OntologySource + ?Sized,
    {
        let mut resolved = ClassAnnotations::default();

        for annotation in ontology.annotations(class, &self.label) {
            let text = literal_of(class, &annotation)?;
            resolved.name = Some(text.to_owned());
            resolved.display_name = Some(text.to_owned());
        }

        for property in self.alternative_terms.properties() {
            for annotation in ontology.annotations(class, property) {
                let text = literal_of(class, &annotation)?;
                resolved.alternative_names.push(text.to_owned());
                if self.alternative_terms.overrides_display_name(property) {
                    resolved.display_name = Some(text.to_owned());
                }
            }
        }

        debug!(
            class = %class,
            display_name = resolved.display_name.as_deref().unwrap_or_default(),
            alternative_names = resolved.alternative_names.len(),
            "class_annotations_resolved"
        );
        Ok(resolved)
    }
}

fn literal_of<'v>(class: &Iri, annotation: &'v Annotation) -> Result<&'v str, MappingError> {
    annotation
        .value()
        .as_literal()
        .ok_or_else(|| MappingError::NonLiteralAnnotation {
            class: class.clone(),
            property: annotation.property().clone(),
        })
}
