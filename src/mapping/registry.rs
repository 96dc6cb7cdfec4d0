use std::collections::HashMap;

use tracing::trace;

use crate::graph::domain::{GraphStoreError, GraphTransaction, NodeId};

/// Idempotent key to node mapping over one open transaction.
///
/// The registry owns the transaction for the duration of a mapping pass and
/// hands it back through [`NodeRegistry::into_transaction`] so the caller can
/// commit or roll back.
pub struct NodeRegistry<T> {
    tx: T,
    resolved: HashMap<String, NodeId>,
    created: usize,
}

impl<T: GraphTransaction> NodeRegistry<T> {
    pub fn new(tx: T) -> Self {
        Self {
            tx,
            resolved: HashMap::new(),
            created: 0,
        }
    }

    /// Returns the node carrying `key`, creating it when the store has none.
    pub async fn get_or_create(&mut self, key: &str) -> Result<NodeId, GraphStoreError> {
        if let Some(node) = self.resolved.get(key) {
            return Ok(*node);
        }
        let node = match self.tx.find_node(key).await? {
            Some(node) => node,
            None => {
                let node = self.tx.create_node(key).await?;
                self.created += 1;
                trace!(key, node = %node, "node_created");
                node
            }
        };
        self.resolved.insert(key.to_owned(), node);
        Ok(node)
    }

    /// Number of nodes this registry created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    /// Direct access to the transaction for property and relationship writes.
    pub fn transaction(&mut self) -> &mut T {
        &mut self.tx
    }

    pub fn into_transaction(self) -> T {
        self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::NodeRegistry;
    use crate::graph::{
        domain::{GraphStore, GraphTransaction},
        memory::InMemoryGraphStore,
    };

    #[tokio::test]
    async fn same_key_yields_same_node() {
        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));

        let first = registry.get_or_create("Biology").await.expect("first");
        let second = registry.get_or_create("Biology").await.expect("second");
        let other = registry.get_or_create("Chemistry").await.expect("other");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(registry.created(), 2);
    }

    #[tokio::test]
    async fn nodes_from_earlier_transactions_are_reused() {
        let store = InMemoryGraphStore::new();
        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let committed = registry.get_or_create("Biology").await.expect("node");
        registry
            .into_transaction()
            .commit()
            .await
            .expect("commit");

        let mut registry = NodeRegistry::new(store.begin().await.expect("begin"));
        let reused = registry.get_or_create("Biology").await.expect("node");
        assert_eq!(committed, reused);
        assert_eq!(registry.created(), 0);
    }
}
