//! Told-structure reasoner used when no external DL reasoner is wired in.
//!
//! The reasoner only follows named `rdfs:subClassOf` and `owl:equivalentClass`
//! axioms. Complex class expressions are ignored, so entailments that need
//! tableau reasoning are not found.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::{
    config::{ReasonerBackend, ReasonerConfig},
    ontology::{
        entities::Ontology,
        repositories::{EquivalenceGroup, ReasonerError, ReasoningOracle},
        value_objects::Iri,
        vocab,
    },
};

/// Builds the reasoner selected in the configuration.
#[must_use]
pub fn from_config<'a>(
    config: &ReasonerConfig,
    ontology: &'a Ontology,
) -> Box<dyn ReasoningOracle + 'a> {
    match config.backend {
        ReasonerBackend::Structural => Box::new(StructuralReasoner::new(ontology)),
    }
}

/// [`ReasoningOracle`] over the asserted class hierarchy.
pub struct StructuralReasoner<'a> {
    ontology: &'a Ontology,
    edges: BTreeMap<Iri, BTreeSet<Iri>>,
    disjoint: BTreeMap<Iri, BTreeSet<Iri>>,
}

impl<'a> StructuralReasoner<'a> {
    #[must_use]
    pub fn new(ontology: &'a Ontology) -> Self {
        let mut edges: BTreeMap<Iri, BTreeSet<Iri>> = BTreeMap::new();
        let mut disjoint: BTreeMap<Iri, BTreeSet<Iri>> = BTreeMap::new();

        for (id, class) in ontology.classes() {
            let targets = edges.entry(id.clone()).or_default();
            targets.extend(class.parents().iter().cloned());
            targets.extend(class.equivalents().iter().cloned());
            // equivalence holds in both directions
            for other in class.equivalents() {
                edges.entry(other.clone()).or_default().insert(id.clone());
            }
            for other in class.disjoints() {
                disjoint.entry(id.clone()).or_default().insert(other.clone());
                disjoint.entry(other.clone()).or_default().insert(id.clone());
            }
        }

        Self {
            ontology,
            edges,
            disjoint,
        }
    }

    /// Every class reachable through told edges. Contains `class` itself only
    /// when it sits on a cycle.
    fn ancestors(&self, class: &Iri) -> BTreeSet<Iri> {
        let mut visited = BTreeSet::new();
        let mut to_visit: VecDeque<&Iri> = self
            .edges
            .get(class)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default();

        while let Some(current) = to_visit.pop_front() {
            if visited.insert(current.clone()) {
                if let Some(targets) = self.edges.get(current) {
                    to_visit.extend(targets.iter());
                }
            }
        }

        visited
    }

    fn type_closure(&self, types: &BTreeSet<Iri>) -> BTreeSet<Iri> {
        let mut closure = types.clone();
        for class in types {
            closure.extend(self.ancestors(class));
        }
        closure
    }
}

impl ReasoningOracle for StructuralReasoner<'_> {
    fn is_consistent(&self) -> Result<bool, ReasonerError> {
        for individual in self.ontology.individuals().values() {
            let closure = self.type_closure(individual.types());
            if closure.iter().any(|class| class.as_str() == vocab::OWL_NOTHING) {
                debug!(individual = %individual.id(), "individual_instantiates_nothing");
                return Ok(false);
            }
            for class in &closure {
                let Some(partners) = self.disjoint.get(class) else {
                    continue;
                };
                if let Some(partner) = partners.iter().find(|partner| closure.contains(*partner)) {
                    debug!(
                        individual = %individual.id(),
                        class = %class,
                        disjoint_with = %partner,
                        "individual_in_disjoint_classes"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn direct_superclasses(&self, class: &Iri) -> Result<Vec<EquivalenceGroup>, ReasonerError> {
        if self.ontology.class(class).is_none() {
            return Err(ReasonerError::UnknownClass(class.clone()));
        }

        let reach: BTreeMap<Iri, BTreeSet<Iri>> = self
            .ancestors(class)
            .into_iter()
            .filter(|candidate| candidate != class && candidate.as_str() != vocab::OWL_THING)
            .map(|candidate| {
                let above = self.ancestors(&candidate);
                (candidate, above)
            })
            .collect();

        // drop the members of the class's own equivalence group
        let strict: BTreeMap<&Iri, &BTreeSet<Iri>> = reach
            .iter()
            .filter(|(_, above)| !above.contains(class))
            .collect();

        let strictly_below = |upper: &Iri, lower: &Iri| {
            strict
                .get(lower)
                .is_some_and(|above| above.contains(upper))
                && !strict.get(upper).is_some_and(|above| above.contains(lower))
        };

        let direct: Vec<&Iri> = strict
            .keys()
            .copied()
            .filter(|candidate| {
                !strict
                    .keys()
                    .any(|other| other != candidate && strictly_below(*candidate, *other))
            })
            .collect();

        let mut groups: Vec<BTreeSet<Iri>> = Vec::new();
        for candidate in direct {
            let existing = groups.iter_mut().find(|group| {
                group.iter().any(|member| {
                    strict[candidate].contains(member)
                        && strict.get(member).is_some_and(|above| above.contains(candidate))
                })
            });
            match existing {
                Some(group) => {
                    group.insert(candidate.clone());
                }
                None => groups.push(BTreeSet::from([candidate.clone()])),
            }
        }

        Ok(groups
            .into_iter()
            .filter_map(|mut members| {
                let representative = members.pop_first()?;
                Some(EquivalenceGroup::new(representative, members))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::StructuralReasoner;
    use crate::ontology::{
        entities::{Class, Individual, Ontology},
        repositories::{EquivalenceGroup, ReasonerError, ReasoningOracle},
        value_objects::Iri,
        vocab,
    };

    fn iri(local: &str) -> Iri {
        Iri::new(format!("https://example.org/onto#{local}")).expect("valid iri")
    }

    fn class(local: &str, parents: &[&str]) -> Class {
        let mut class = Class::new(iri(local));
        for parent in parents {
            class.add_parent(iri(parent));
        }
        class
    }

    fn ontology(classes: Vec<Class>) -> Ontology {
        let mut ontology = Ontology::new();
        for class in classes {
            ontology.add_class(class).expect("class inserted");
        }
        ontology
    }

    #[test]
    fn top_level_classes_have_no_direct_superclasses() {
        let mut root = class("Root", &[]);
        root.add_parent(Iri::new(vocab::OWL_THING).expect("thing"));
        let ontology = ontology(vec![root]);
        let reasoner = StructuralReasoner::new(&ontology);
        assert!(reasoner
            .direct_superclasses(&iri("Root"))
            .expect("superclasses")
            .is_empty());
    }

    #[test]
    fn transitive_ancestors_are_not_direct() {
        let ontology = ontology(vec![
            class("Science", &[]),
            class("Biology", &["Science"]),
            class("Genetics", &["Biology", "Science"]),
        ]);
        let reasoner = StructuralReasoner::new(&ontology);
        assert_eq!(
            reasoner
                .direct_superclasses(&iri("Genetics"))
                .expect("superclasses"),
            vec![EquivalenceGroup::single(iri("Biology"))]
        );
    }

    #[test]
    fn multiple_parents_are_all_direct() {
        let ontology = ontology(vec![
            class("Biology", &[]),
            class("Chemistry", &[]),
            class("Biochemistry", &["Biology", "Chemistry"]),
        ]);
        let reasoner = StructuralReasoner::new(&ontology);
        let groups = reasoner
            .direct_superclasses(&iri("Biochemistry"))
            .expect("superclasses");
        let representatives: Vec<_> = groups
            .iter()
            .map(EquivalenceGroup::representative)
            .collect();
        assert_eq!(representatives, vec![&iri("Biology"), &iri("Chemistry")]);
    }

    #[test]
    fn equivalent_superclasses_form_one_group() {
        let mut life_science = class("LifeScience", &[]);
        life_science.add_equivalent(iri("Biology"));
        let ontology = ontology(vec![
            class("Biology", &[]),
            life_science,
            class("Zoology", &["Biology", "LifeScience"]),
        ]);
        let reasoner = StructuralReasoner::new(&ontology);
        let groups = reasoner
            .direct_superclasses(&iri("Zoology"))
            .expect("superclasses");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].representative(), &iri("Biology"));
        assert!(groups[0].members().contains(&iri("LifeScience")));
    }

    #[test]
    fn own_equivalents_are_not_superclasses() {
        let mut biology = class("Biology", &["Science"]);
        biology.add_equivalent(iri("LifeScience"));
        let ontology = ontology(vec![
            class("Science", &[]),
            biology,
            class("LifeScience", &[]),
        ]);
        let reasoner = StructuralReasoner::new(&ontology);
        let groups = reasoner
            .direct_superclasses(&iri("LifeScience"))
            .expect("superclasses");
        assert_eq!(groups, vec![EquivalenceGroup::single(iri("Science"))]);
    }

    #[test]
    fn unknown_classes_are_reported() {
        let ontology = ontology(vec![class("Biology", &[])]);
        let reasoner = StructuralReasoner::new(&ontology);
        let err = reasoner
            .direct_superclasses(&iri("Missing"))
            .expect_err("unknown class");
        assert_eq!(err, ReasonerError::UnknownClass(iri("Missing")));
    }

    #[test]
    fn disjoint_membership_is_inconsistent() {
        let mut plant = class("Plant", &[]);
        plant.add_disjoint(iri("Animal"));
        let mut ontology = ontology(vec![plant, class("Animal", &[]), class("Dog", &["Animal"])]);
        let mut rex = Individual::new(iri("rex"));
        rex.assert_type(iri("Dog"));
        rex.assert_type(iri("Plant"));
        ontology.add_individual(rex).expect("individual inserted");

        let reasoner = StructuralReasoner::new(&ontology);
        assert!(!reasoner.is_consistent().expect("consistency"));
    }

    #[test]
    fn ontology_without_clashes_is_consistent() {
        let mut plant = class("Plant", &[]);
        plant.add_disjoint(iri("Animal"));
        let mut ontology = ontology(vec![plant, class("Animal", &[]), class("Dog", &["Animal"])]);
        let mut rex = Individual::new(iri("rex"));
        rex.assert_type(iri("Dog"));
        ontology.add_individual(rex).expect("individual inserted");

        let reasoner = StructuralReasoner::new(&ontology);
        assert!(reasoner.is_consistent().expect("consistency"));
    }
}
