use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{names::NameResolver, registry::NodeRegistry, MappingError};
use crate::{
    graph::domain::{GraphTransaction, NodeId, RelationshipKind},
    ontology::{
        repositories::{EquivalenceGroup, OntologySource, ReasoningOracle},
        value_objects::Iri,
        vocab,
    },
};

/// Which member of an equivalence group becomes the `partOf` target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativePolicy {
    /// Whatever the reasoner reports first.
    #[default]
    Oracle,
    /// The smallest IRI of the group, stable across reasoners.
    Canonical,
}

impl RepresentativePolicy {
    #[must_use]
    pub fn pick(self, group: &EquivalenceGroup) -> &Iri {
        match self {
            Self::Oracle => group.representative(),
            Self::Canonical => group.canonical(),
        }
    }
}

/// Relationship counts written for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyLinks {
    pub is_a: usize,
    pub part_of: usize,
}

/// Writes the hierarchy edges of a class from its direct inferred superclasses.
pub struct HierarchyResolver<'a> {
    source: &'a dyn OntologySource,
    oracle: &'a dyn ReasoningOracle,
    names: &'a dyn NameResolver,
    policy: RepresentativePolicy,
}

impl<'a> HierarchyResolver<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn OntologySource,
        oracle: &'a dyn ReasoningOracle,
        names: &'a dyn NameResolver,
    ) -> Self {
        Self {
            source,
            oracle,
            names,
            policy: RepresentativePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RepresentativePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Links `node` to `root` with `isA` when the class has no direct
    /// superclass other than `owl:Thing`. Otherwise links it with `partOf`
    /// to one node per superclass group, creating target nodes on demand.
    pub async fn link<T: GraphTransaction>(
        &self,
        registry: &mut NodeRegistry<T>,
        class: &Iri,
        node: NodeId,
        root: NodeId,
    ) -> Result<HierarchyLinks, MappingError> {
        let groups: Vec<EquivalenceGroup> = self
            .oracle
            .direct_superclasses(class)?
            .into_iter()
            .filter(|group| {
                !group
                    .members()
                    .iter()
                    .any(|member| member.as_str() == vocab::OWL_THING)
            })
            .collect();

        let mut links = HierarchyLinks::default();
        if groups.is_empty() {
            registry
                .transaction()
                .create_relationship(node, root, RelationshipKind::IsA)
                .await?;
            links.is_a += 1;
            trace!(class = %class, "linked_to_root");
            return Ok(links);
        }

        for group in &groups {
            let parent = self.policy.pick(group);
            let key = self
                .names
                .key_for(&self.source.qualified_identifier(parent));
            let target = registry.get_or_create(&key).await?;
            registry
                .transaction()
                .create_relationship(node, target, RelationshipKind::PartOf)
                .await?;
            links.part_of += 1;
            trace!(class = %class, parent = %parent, key = %key, "linked_to_parent");
        }
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::{HierarchyResolver, RepresentativePolicy};
    use crate::{
        graph::{
            domain::{GraphStore, GraphTransaction, RelationshipKind, ROOT_KEY},
            memory::InMemoryGraphStore,
        },
        mapping::{names::FragmentKeyResolver, registry::NodeRegistry},
        ontology::{
            entities::Ontology,
            reasoner::StructuralReasoner,
            repositories::{EquivalenceGroup, ReasonerError, ReasoningOracle},
            value_objects::Iri,
        },
    };

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn subject(name: &str) -> Iri {
        iri(&format!("http://www.fairsharing.org/ontology/subject#{name}"))
    }

    struct FixedOracle(Vec<EquivalenceGroup>);

    impl ReasoningOracle for FixedOracle {
        fn is_consistent(&self) -> Result<bool, ReasonerError> {
            Ok(true)
        }

        fn direct_superclasses(&self, _: &Iri) -> Result<Vec<EquivalenceGroup>, ReasonerError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn top_level_class_is_a_root() {
        let mut ontology = Ontology::new();
        ontology.declare_class(subject("Biology"));
        let reasoner = StructuralReasoner::new(&ontology);
        let resolver = HierarchyResolver::new(&ontology, &reasoner, &FragmentKeyResolver);

        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let root = registry.get_or_create(ROOT_KEY).await.expect("root");
        let node = registry.get_or_create("Biology").await.expect("node");

        let links = resolver
            .link(&mut registry, &subject("Biology"), node, root)
            .await
            .expect("link");
        assert_eq!((links.is_a, links.part_of), (1, 0));
        registry.into_transaction().commit().await.expect("commit");

        let snapshot = store.snapshot().await.expect("snapshot");
        let edges: Vec<_> = snapshot.outgoing(node).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, root);
        assert_eq!(edges[0].kind, RelationshipKind::IsA);
    }

    #[tokio::test]
    async fn each_parent_gets_one_part_of_edge() {
        let mut ontology = Ontology::new();
        ontology.declare_class(subject("Genetics")).add_parent(subject("Biology"));
        ontology
            .declare_class(subject("Genetics"))
            .add_parent(subject("Medicine"));
        ontology.declare_class(subject("Biology"));
        ontology.declare_class(subject("Medicine"));
        let reasoner = StructuralReasoner::new(&ontology);
        let resolver = HierarchyResolver::new(&ontology, &reasoner, &FragmentKeyResolver);

        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let root = registry.get_or_create(ROOT_KEY).await.expect("root");
        let node = registry.get_or_create("Genetics").await.expect("node");
        let links = resolver
            .link(&mut registry, &subject("Genetics"), node, root)
            .await
            .expect("link");
        assert_eq!((links.is_a, links.part_of), (0, 2));
        assert_eq!(registry.created(), 4);
        registry.into_transaction().commit().await.expect("commit");

        let snapshot = store.snapshot().await.expect("snapshot");
        let mut targets: Vec<_> = snapshot
            .outgoing(node)
            .map(|edge| {
                assert_eq!(edge.kind, RelationshipKind::PartOf);
                snapshot
                    .nodes
                    .iter()
                    .find(|candidate| candidate.id == edge.to)
                    .map(|candidate| candidate.key.clone())
                    .expect("target node")
            })
            .collect();
        targets.sort();
        assert_eq!(targets, vec!["Biology", "Medicine"]);
    }

    #[tokio::test]
    async fn representative_policy_selects_target() {
        let group = EquivalenceGroup::new(subject("LifeScience"), [subject("Biology")]);
        let oracle = FixedOracle(vec![group]);
        let ontology = Ontology::new();

        for (policy, expected) in [
            (RepresentativePolicy::Oracle, "LifeScience"),
            (RepresentativePolicy::Canonical, "Biology"),
        ] {
            let resolver = HierarchyResolver::new(&ontology, &oracle, &FragmentKeyResolver)
                .with_policy(policy);
            let store = InMemoryGraphStore::new();
            let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
            let root = registry.get_or_create(ROOT_KEY).await.expect("root");
            let node = registry.get_or_create("Genetics").await.expect("node");
            resolver
                .link(&mut registry, &subject("Genetics"), node, root)
                .await
                .expect("link");
            registry.into_transaction().commit().await.expect("commit");

            let snapshot = store.snapshot().await.expect("snapshot");
            assert!(snapshot.node_by_key(expected).is_some(), "{policy:?}");
            assert_eq!(snapshot.nodes.len(), 3);
        }
    }

    #[tokio::test]
    async fn thing_reported_as_parent_links_to_root() {
        let oracle = FixedOracle(vec![EquivalenceGroup::single(iri(
            "http://www.w3.org/2002/07/owl#Thing",
        ))]);
        let ontology = Ontology::new();
        let resolver = HierarchyResolver::new(&ontology, &oracle, &FragmentKeyResolver);
        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let root = registry.get_or_create(ROOT_KEY).await.expect("root");
        let node = registry.get_or_create("Biology").await.expect("node");

        let links = resolver
            .link(&mut registry, &subject("Biology"), node, root)
            .await
            .expect("link");
        assert_eq!((links.is_a, links.part_of), (1, 0));
        assert_eq!(registry.created(), 2);
    }

    #[tokio::test]
    async fn group_equivalent_to_thing_links_to_root() {
        let group = EquivalenceGroup::new(
            subject("Anything"),
            [iri("http://www.w3.org/2002/07/owl#Thing")],
        );
        let oracle = FixedOracle(vec![group]);
        let ontology = Ontology::new();
        let resolver = HierarchyResolver::new(&ontology, &oracle, &FragmentKeyResolver);
        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let root = registry.get_or_create(ROOT_KEY).await.expect("root");
        let node = registry.get_or_create("Biology").await.expect("node");

        let links = resolver
            .link(&mut registry, &subject("Biology"), node, root)
            .await
            .expect("link");
        assert_eq!((links.is_a, links.part_of), (1, 0));
        registry.into_transaction().commit().await.expect("commit");

        let snapshot = store.snapshot().await.expect("snapshot");
        assert!(snapshot.node_by_key("Anything").is_none());
        let edges: Vec<_> = snapshot.outgoing(node).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, root);
        assert_eq!(edges[0].kind, RelationshipKind::IsA);
    }
}
