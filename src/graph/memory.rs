use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;

use super::domain::{
    GraphSnapshot, GraphStore, GraphStoreError, GraphTransaction, NodeId, PropertyValue,
    RelationshipKind, StoredNode, StoredRelationship, CLASS_NAME,
};

#[derive(Debug, Clone, Default)]
struct GraphState {
    next_id: i64,
    nodes: BTreeMap<NodeId, StoredNode>,
    keys: HashMap<String, NodeId>,
    relationships: Vec<StoredRelationship>,
}

impl GraphState {
    fn node_mut(&mut self, node: NodeId) -> Result<&mut StoredNode, GraphStoreError> {
        self.nodes
            .get_mut(&node)
            .ok_or(GraphStoreError::MissingNode(node))
    }
}

/// Process-local graph store.
///
/// A transaction works on a private copy of the graph taken when it begins
/// and replaces the shared graph when it commits. The store assumes a single
/// writer: two transactions committed concurrently overwrite each other.
#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    state: Arc<Mutex<GraphState>>,
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Transaction handed out by [`InMemoryGraphStore`].
pub struct InMemoryTransaction {
    shared: Arc<Mutex<GraphState>>,
    staged: GraphState,
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, GraphStoreError> {
        let staged = self.guard().clone();
        Ok(InMemoryTransaction {
            shared: Arc::clone(&self.state),
            staged,
        })
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, GraphStoreError> {
        let guard = self.guard();
        Ok(GraphSnapshot {
            nodes: guard.nodes.values().cloned().collect(),
            relationships: guard.relationships.clone(),
        })
    }
}

#[async_trait]
impl GraphTransaction for InMemoryTransaction {
    async fn find_node(&mut self, key: &str) -> Result<Option<NodeId>, GraphStoreError> {
        Ok(self.staged.keys.get(key).copied())
    }

    async fn create_node(&mut self, key: &str) -> Result<NodeId, GraphStoreError> {
        if self.staged.keys.contains_key(key) {
            return Err(GraphStoreError::DuplicateKey(key.to_owned()));
        }
        self.staged.next_id += 1;
        let id = NodeId(self.staged.next_id);
        let node = StoredNode {
            id,
            key: key.to_owned(),
            labels: BTreeSet::new(),
            properties: BTreeMap::from([(CLASS_NAME.to_owned(), PropertyValue::from(key))]),
        };
        self.staged.nodes.insert(id, node);
        self.staged.keys.insert(key.to_owned(), id);
        Ok(id)
    }

    async fn set_property(
        &mut self,
        node: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), GraphStoreError> {
        self.staged
            .node_mut(node)?
            .properties
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), GraphStoreError> {
        self.staged.node_mut(node)?.labels.insert(label.to_owned());
        Ok(())
    }

    async fn create_relationship(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: RelationshipKind,
    ) -> Result<(), GraphStoreError> {
        for node in [from, to] {
            if !self.staged.nodes.contains_key(&node) {
                return Err(GraphStoreError::MissingNode(node));
            }
        }
        self.staged
            .relationships
            .push(StoredRelationship { from, to, kind });
        Ok(())
    }

    async fn commit(self) -> Result<(), GraphStoreError> {
        let mut guard = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), GraphStoreError> {
        Ok(())
    }
}
