//! Reads ontology documents into an [`Ontology`] aggregate.
//!
//! The loader understands the RDF serialisation of OWL as far as the mapping
//! needs it: declarations, annotations, named class axioms and class
//! assertions on named individuals. Blank-node class expressions are skipped.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use oxrdf::Term;
use oxrdfio::{RdfFormat, RdfParseError, RdfParser};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    entities::{Annotation, AnnotationValue, Individual, Ontology, OntologyError},
    value_objects::Iri,
    vocab,
};

/// Fatal errors raised while reading an ontology document.
#[derive(Debug, Error)]
pub enum OntologyLoadError {
    #[error("cannot read ontology `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid in the serialisation its extension implies.
    #[error("cannot parse ontology `{}`: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid ontology `{}`: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: OntologyError,
    },
}

/// Serialisation implied by a file extension. Unknown extensions are read
/// as RDF/XML.
#[must_use]
pub fn format_for(path: &Path) -> RdfFormat {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ttl") => RdfFormat::Turtle,
        Some("nt") => RdfFormat::NTriples,
        Some("nq") => RdfFormat::NQuads,
        Some("trig") => RdfFormat::TriG,
        Some("n3") => RdfFormat::N3,
        _ => RdfFormat::RdfXml,
    }
}

pub struct OntologyLoader;

impl OntologyLoader {
    /// Parses the document at `path`.
    ///
    /// # Errors
    ///
    /// When the file cannot be opened or is malformed.
    pub fn load(path: &Path) -> Result<Ontology, OntologyLoadError> {
        let file = File::open(path).map_err(|source| OntologyLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ontology = Self::from_reader(BufReader::new(file), format_for(path), path)?;
        info!(
            path = %path.display(),
            classes = ontology.classes().len(),
            annotation_properties = ontology.annotation_properties().len(),
            individuals = ontology.individuals().len(),
            "ontology_loaded"
        );
        Ok(ontology)
    }

    /// Parses a document from any reader. `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// When the document is malformed.
    pub fn from_reader(
        reader: impl Read,
        format: RdfFormat,
        origin: &Path,
    ) -> Result<Ontology, OntologyLoadError> {
        let statements = read_statements(reader, format).map_err(|err| OntologyLoadError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        debug!(path = %origin.display(), statements = statements.len(), "ontology_parsed");
        build(&statements).map_err(|source| OntologyLoadError::Invalid {
            path: origin.to_path_buf(),
            source,
        })
    }
}

enum Object {
    Iri(Iri),
    Literal(String),
    Other,
}

struct Statement {
    subject: Iri,
    predicate: Iri,
    object: Object,
}

fn read_statements(reader: impl Read, format: RdfFormat) -> Result<Vec<Statement>, RdfParseError> {
    let mut statements = Vec::new();
    for quad in RdfParser::from_format(format).for_reader(reader) {
        let quad = quad?;
        let Term::NamedNode(subject) = Term::from(quad.subject) else {
            continue;
        };
        let object = match quad.object {
            Term::NamedNode(node) => Object::Iri(Iri::from(node)),
            Term::Literal(literal) => Object::Literal(literal.value().to_owned()),
            _ => Object::Other,
        };
        statements.push(Statement {
            subject: Iri::from(subject),
            predicate: Iri::from(quad.predicate),
            object,
        });
    }
    Ok(statements)
}

fn named_class(iri: &Iri) -> bool {
    !vocab::is_reserved(iri.as_str())
}

fn build(statements: &[Statement]) -> Result<Ontology, OntologyError> {
    let mut ontology = Ontology::new();
    for property in vocab::BUILTIN_ANNOTATION_PROPERTIES {
        ontology.declare_annotation_property(Iri::known(property));
    }

    let mut id = None;
    let mut individuals: BTreeMap<Iri, BTreeSet<Iri>> = BTreeMap::new();
    let mut assertions: Vec<(&Iri, &Iri)> = Vec::new();

    for statement in statements {
        if statement.predicate.as_str() != vocab::RDF_TYPE {
            continue;
        }
        let Object::Iri(kind) = &statement.object else {
            continue;
        };
        match kind.as_str() {
            vocab::OWL_CLASS | vocab::RDFS_CLASS => {
                if named_class(&statement.subject) {
                    ontology.declare_class(statement.subject.clone());
                }
            }
            vocab::OWL_ANNOTATION_PROPERTY => {
                ontology.declare_annotation_property(statement.subject.clone());
            }
            vocab::OWL_ONTOLOGY => {
                id.get_or_insert_with(|| statement.subject.clone());
            }
            vocab::OWL_NAMED_INDIVIDUAL => {
                individuals.entry(statement.subject.clone()).or_default();
            }
            other if !vocab::is_reserved(other) => assertions.push((&statement.subject, kind)),
            _ => {}
        }
    }

    for statement in statements {
        let Object::Iri(object) = &statement.object else {
            continue;
        };
        let subject = &statement.subject;
        match statement.predicate.as_str() {
            vocab::RDFS_SUB_CLASS_OF if named_class(subject) => {
                let class = ontology.declare_class(subject.clone());
                if named_class(object) {
                    class.add_parent(object.clone());
                    ontology.declare_class(object.clone());
                }
            }
            vocab::OWL_EQUIVALENT_CLASS if named_class(subject) && named_class(object) => {
                ontology
                    .declare_class(subject.clone())
                    .add_equivalent(object.clone());
                ontology
                    .declare_class(object.clone())
                    .add_equivalent(subject.clone());
            }
            vocab::OWL_DISJOINT_WITH if named_class(subject) && named_class(object) => {
                ontology
                    .declare_class(subject.clone())
                    .add_disjoint(object.clone());
                ontology
                    .declare_class(object.clone())
                    .add_disjoint(subject.clone());
            }
            vocab::RDFS_SUB_PROPERTY_OF if ontology.annotation_property(subject).is_some() => {
                ontology
                    .declare_annotation_property(subject.clone())
                    .add_super_property(object.clone());
            }
            _ => {}
        }
    }

    for (subject, class) in assertions {
        let is_entity = ontology.class(subject).is_some()
            || ontology.annotation_property(subject).is_some();
        if !is_entity && ontology.class(class).is_some() {
            individuals
                .entry(subject.clone())
                .or_default()
                .insert(class.clone());
        }
    }
    for (individual_id, types) in individuals {
        let mut individual = Individual::new(individual_id);
        for class in types {
            individual.assert_type(class);
        }
        ontology.add_individual(individual)?;
    }

    for statement in statements {
        if ontology.class(&statement.subject).is_none()
            || ontology.annotation_property(&statement.predicate).is_none()
        {
            continue;
        }
        let value = match &statement.object {
            Object::Literal(text) => AnnotationValue::Literal(text.clone()),
            Object::Iri(iri) => AnnotationValue::Iri(iri.clone()),
            Object::Other => continue,
        };
        ontology
            .declare_class(statement.subject.clone())
            .annotate(Annotation::new(statement.predicate.clone(), value));
    }

    Ok(match id {
        Some(id) => ontology.with_id(id),
        None => ontology,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use oxrdfio::RdfFormat;
    use rstest::rstest;

    use super::{format_for, OntologyLoadError, OntologyLoader};
    use crate::ontology::{
        entities::{AnnotationValue, Ontology},
        repositories::OntologySource,
        value_objects::Iri,
        vocab,
    };

    const SUBJECTS: &str = r#"
@prefix : <http://www.fairsharing.org/ontology/subject#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix obo: <http://purl.obolibrary.org/obo/> .

<http://www.fairsharing.org/ontology/subject> a owl:Ontology .
obo:IAO_0000118 a owl:AnnotationProperty .
<http://www.fairsharing.org/fairsharing/FAIRO_0000001> a owl:AnnotationProperty ;
    rdfs:subPropertyOf obo:IAO_0000118 .

:Biology a owl:Class ;
    rdfs:subClassOf owl:Thing ;
    rdfs:label "biology" , "Biology" ;
    obo:IAO_0000118 "Life science" .
:Genetics a owl:Class ;
    rdfs:subClassOf :Biology , [ a owl:Restriction ] ;
    rdfs:seeAlso <http://example.org/genetics> .
:Heredity owl:equivalentClass :Genetics .
:Chemistry a owl:Class ; owl:disjointWith :Biology .
:sample a owl:NamedIndividual , :Genetics .
"#;

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn subject(name: &str) -> Iri {
        iri(&format!("http://www.fairsharing.org/ontology/subject#{name}"))
    }

    fn parse(content: &str) -> Ontology {
        OntologyLoader::from_reader(content.as_bytes(), RdfFormat::Turtle, Path::new("inline.ttl"))
            .expect("ontology")
    }

    #[test]
    fn builds_classes_and_axioms() {
        let ontology = parse(SUBJECTS);

        assert_eq!(
            ontology.id(),
            Some(&iri("http://www.fairsharing.org/ontology/subject"))
        );
        assert_eq!(
            ontology.classes_in_signature(),
            vec![
                subject("Biology"),
                subject("Chemistry"),
                subject("Genetics"),
                subject("Heredity")
            ]
        );
        let genetics = ontology.class(&subject("Genetics")).expect("genetics");
        assert_eq!(genetics.parents().len(), 1);
        assert!(genetics.equivalents().contains(&subject("Heredity")));
        assert!(ontology
            .class(&subject("Biology"))
            .expect("biology")
            .parents()
            .is_empty());
        assert!(ontology
            .class(&subject("Biology"))
            .expect("biology")
            .disjoints()
            .contains(&subject("Chemistry")));

        let sample = &ontology.individuals()[&subject("sample")];
        assert!(sample.types().contains(&subject("Genetics")));
    }

    #[test]
    fn keeps_annotations_in_document_order() {
        let ontology = parse(SUBJECTS);
        let labels: Vec<_> = ontology
            .annotations(&subject("Biology"), &iri(vocab::RDFS_LABEL))
            .into_iter()
            .filter_map(|annotation| annotation.value().as_literal().map(str::to_owned))
            .collect();
        assert_eq!(labels, vec!["biology", "Biology"]);

        let see_also = ontology.annotations(&subject("Genetics"), &iri(vocab::RDFS_SEE_ALSO));
        assert_eq!(
            see_also[0].value(),
            &AnnotationValue::Iri(iri("http://example.org/genetics"))
        );
    }

    #[test]
    fn resolves_annotation_sub_properties() {
        let ontology = parse(SUBJECTS);
        assert_eq!(
            ontology.sub_properties(&iri(vocab::OBO_ALTERNATIVE_TERM)),
            vec![iri(vocab::FAIRSHARING_ALTERNATIVE_TERM)]
        );
        assert!(ontology
            .annotation_properties_in_signature()
            .contains(&iri(vocab::RDFS_LABEL)));
    }

    #[test]
    fn reads_files_by_extension() {
        let tree = tree_fs::TreeBuilder::default()
            .add_file("subjects.ttl", SUBJECTS)
            .add_file(
                "subjects.nt",
                "<http://example.org/A> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Class> .\n",
            )
            .create()
            .expect("tree");

        let turtle = OntologyLoader::load(&tree.root.join("subjects.ttl")).expect("turtle");
        assert_eq!(turtle.classes().len(), 4);
        let triples = OntologyLoader::load(&tree.root.join("subjects.nt")).expect("n-triples");
        assert_eq!(triples.classes().len(), 1);
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        let tree = tree_fs::TreeBuilder::default()
            .add_file("broken.ttl", ":Biology a owl:Class")
            .create()
            .expect("tree");
        let err = OntologyLoader::load(&tree.root.join("broken.ttl")).expect_err("broken");
        assert!(matches!(err, OntologyLoadError::Parse { .. }));

        let err = OntologyLoader::load(&tree.root.join("missing.owl")).expect_err("missing");
        assert!(matches!(err, OntologyLoadError::Io { .. }));
    }

    #[rstest]
    #[case("a/disciplines.owl", RdfFormat::RdfXml)]
    #[case("a/taxon.TTL", RdfFormat::Turtle)]
    #[case("a/b.nt", RdfFormat::NTriples)]
    #[case("a/b.nq", RdfFormat::NQuads)]
    #[case("a/b.trig", RdfFormat::TriG)]
    #[case("a/b", RdfFormat::RdfXml)]
    fn picks_format_from_extension(#[case] path: &str, #[case] expected: RdfFormat) {
        assert_eq!(format_for(Path::new(path)), expected);
    }
}
