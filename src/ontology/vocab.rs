//! IRIs of the RDF, RDFS and OWL terms the loader and reasoner understand,
//! plus the annotation properties the mapping pass treats specially.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
pub const RDFS_SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
pub const RDFS_IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";
pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";

pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";
pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
pub const OWL_DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";

/// OBO "alternative term" annotation property.
pub const OBO_ALTERNATIVE_TERM: &str = "http://purl.obolibrary.org/obo/IAO_0000118";
/// FAIRsharing alternative term whose literal also becomes the display name.
pub const FAIRSHARING_ALTERNATIVE_TERM: &str =
    "http://www.fairsharing.org/fairsharing/FAIRO_0000001";

pub const OIO_HAS_EXACT_SYNONYM: &str =
    "http://www.geneontology.org/formats/oboInOwl#hasExactSynonym";
pub const OIO_HAS_RELATED_SYNONYM: &str =
    "http://www.geneontology.org/formats/oboInOwl#hasRelatedSynonym";
pub const OIO_HAS_BROAD_SYNONYM: &str =
    "http://www.geneontology.org/formats/oboInOwl#hasBroadSynonym";

/// Annotation properties every ontology carries without declaring them.
pub const BUILTIN_ANNOTATION_PROPERTIES: [&str; 4] =
    [RDFS_LABEL, RDFS_COMMENT, RDFS_SEE_ALSO, RDFS_IS_DEFINED_BY];

/// Returns `true` for IRIs in the RDF, RDFS or OWL namespaces.
#[must_use]
pub fn is_reserved(iri: &str) -> bool {
    iri.starts_with("http://www.w3.org/1999/02/22-rdf-syntax-ns#")
        || iri.starts_with("http://www.w3.org/2000/01/rdf-schema#")
        || iri.starts_with("http://www.w3.org/2002/07/owl#")
        || iri.starts_with("http://www.w3.org/2001/XMLSchema#")
}
