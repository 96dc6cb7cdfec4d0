use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{
    annotations::{AlternativeTermProperties, AnnotationExtractor},
    classifier::{Category, LabelClassifier},
    hierarchy::{HierarchyResolver, RepresentativePolicy},
    names::{KeyStrategy, NameResolver},
    registry::NodeRegistry,
    MappingError,
};
use crate::{
    config::{AnnotationConfig, MappingConfig},
    graph::domain::{
        GraphStore, GraphTransaction, PropertyValue, ALTERNATIVE_NAMES, DISPLAY_NAME, IRI, NAME,
        ROOT_KEY,
    },
    ontology::repositories::{OntologySource, ReasoningOracle},
};

/// Lifecycle of one mapping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingState {
    Idle,
    ConsistencyChecked,
    Mapping,
    Committed,
    Aborted,
}

impl fmt::Display for MappingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ConsistencyChecked => "consistency_checked",
            Self::Mapping => "mapping",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Everything a mapping pass reads, resolved before the pass starts.
pub struct MappingContext<'a> {
    source: String,
    category: Category,
    ontology: &'a dyn OntologySource,
    oracle: &'a dyn ReasoningOracle,
    alternative_terms: AlternativeTermProperties,
}

impl<'a> MappingContext<'a> {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        category: Category,
        ontology: &'a dyn OntologySource,
        oracle: &'a dyn ReasoningOracle,
        alternative_terms: AlternativeTermProperties,
    ) -> Self {
        Self {
            source: source.into(),
            category,
            ontology,
            oracle,
            alternative_terms,
        }
    }

    /// Classifies `source` and resolves the alternative-term properties of
    /// `ontology` once for the whole pass.
    #[must_use]
    pub fn resolve(
        source: impl Into<String>,
        ontology: &'a dyn OntologySource,
        oracle: &'a dyn ReasoningOracle,
        classifier: &LabelClassifier,
        annotations: &AnnotationConfig,
    ) -> Self {
        let source = source.into();
        let category = classifier.classify(&source);
        let alternative_terms = AlternativeTermProperties::resolve(ontology, annotations);
        Self::new(source, category, ontology, oracle, alternative_terms)
    }
}

/// Counters collected during a pass. Only meaningful for committed passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub classes: usize,
    pub nodes_created: usize,
    pub is_a: usize,
    pub part_of: usize,
}

/// Outcome of mapping one ontology.
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub source: String,
    pub category: Category,
    pub state: MappingState,
    pub stats: MappingStats,
    pub failure: Option<String>,
}

impl MappingReport {
    fn new(context: &MappingContext<'_>) -> Self {
        Self {
            source: context.source.clone(),
            category: context.category,
            state: MappingState::Idle,
            stats: MappingStats::default(),
            failure: None,
        }
    }

    fn advance(&mut self, state: MappingState) {
        debug!(source = %self.source, from = %self.state, to = %state, "mapping_state_changed");
        self.state = state;
    }

    fn abort(mut self, err: &MappingError) -> Self {
        error!(
            source = %self.source,
            state = %self.state,
            err.msg = %err,
            err.detail = ?err,
            "mapping_aborted"
        );
        self.state = MappingState::Aborted;
        self.stats = MappingStats::default();
        self.failure = Some(err.to_string());
        self
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state == MappingState::Committed
    }
}

/// Maps the class hierarchy of one ontology at a time into a [`GraphStore`],
/// each pass inside its own transaction.
pub struct GraphMappingOrchestrator<'s, S> {
    store: &'s S,
    names: Box<dyn NameResolver>,
    policy: RepresentativePolicy,
}

impl<'s, S: GraphStore> GraphMappingOrchestrator<'s, S> {
    #[must_use]
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            names: KeyStrategy::default().resolver(),
            policy: RepresentativePolicy::default(),
        }
    }

    #[must_use]
    pub fn from_config(store: &'s S, config: &MappingConfig) -> Self {
        Self::new(store)
            .with_key_strategy(config.key_strategy)
            .with_representative(config.representative)
    }

    #[must_use]
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.names = strategy.resolver();
        self
    }

    #[must_use]
    pub fn with_representative(mut self, policy: RepresentativePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs one pass. Failures end in [`MappingState::Aborted`] with nothing
    /// from this pass persisted; they are reported, never returned as errors.
    pub async fn map_ontology(&self, context: &MappingContext<'_>) -> MappingReport {
        let mut report = MappingReport::new(context);

        match context.oracle.is_consistent() {
            Ok(true) => report.advance(MappingState::ConsistencyChecked),
            Ok(false) => return report.abort(&MappingError::Inconsistent),
            Err(err) => return report.abort(&err.into()),
        }

        let tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(err) => return report.abort(&err.into()),
        };
        report.advance(MappingState::Mapping);

        let mut registry = NodeRegistry::new(tx);
        let mut stats = MappingStats::default();
        if let Err(err) = self.populate(&mut registry, context, &mut stats).await {
            let tx = registry.into_transaction();
            if let Err(rollback) = tx.rollback().await {
                warn!(source = %context.source, err.msg = %rollback, "mapping_rollback_failed");
            }
            return report.abort(&err);
        }

        stats.nodes_created = registry.created();
        if let Err(err) = registry.into_transaction().commit().await {
            return report.abort(&err.into());
        }

        report.stats = stats;
        report.advance(MappingState::Committed);
        info!(
            source = %report.source,
            category = %report.category,
            classes = stats.classes,
            nodes_created = stats.nodes_created,
            is_a = stats.is_a,
            part_of = stats.part_of,
            "mapping_committed"
        );
        report
    }

    async fn populate<T: GraphTransaction>(
        &self,
        registry: &mut NodeRegistry<T>,
        context: &MappingContext<'_>,
        stats: &mut MappingStats,
    ) -> Result<(), MappingError> {
        let root = registry.get_or_create(ROOT_KEY).await?;
        let extractor = AnnotationExtractor::new(&context.alternative_terms);
        let hierarchy = HierarchyResolver::new(context.ontology, context.oracle, &*self.names)
            .with_policy(self.policy);
        let label = context.category.as_str();

        for class in context.ontology.classes_in_signature() {
            let key = self
                .names
                .key_for(&context.ontology.qualified_identifier(&class));
            let node = registry.get_or_create(&key).await?;

            let tx = registry.transaction();
            tx.set_property(node, IRI, PropertyValue::from(class.as_str()))
                .await?;
            tx.add_label(node, label).await?;

            let annotations = extractor.extract(context.ontology, &class)?;
            if let Some(name) = annotations.name {
                tx.set_property(node, NAME, PropertyValue::from(name)).await?;
            }
            if let Some(display_name) = annotations.display_name {
                tx.set_property(node, DISPLAY_NAME, PropertyValue::from(display_name))
                    .await?;
            }
            tx.set_property(
                node,
                ALTERNATIVE_NAMES,
                PropertyValue::from(annotations.alternative_names),
            )
            .await?;

            let links = hierarchy.link(registry, &class, node, root).await?;
            stats.classes += 1;
            stats.is_a += links.is_a;
            stats.part_of += links.part_of;
        }
        Ok(())
    }
}
