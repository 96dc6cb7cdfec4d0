use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node property holding the deduplication key.
pub const CLASS_NAME: &str = "className";
/// Node property holding the full IRI of the source class.
pub const IRI: &str = "iri";
/// Node property holding the primary label.
pub const NAME: &str = "name";
/// Node property holding the label shown to users.
pub const DISPLAY_NAME: &str = "displayName";
/// Node property holding the ordered alternative terms.
pub const ALTERNATIVE_NAMES: &str = "alternativeNames";

/// Key of the singleton root node every top-level class hangs from.
pub const ROOT_KEY: &str = "owl:Thing";

/// Store-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value stored under a node property key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    TextList(Vec<String>),
}

impl PropertyValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::TextList(_) => None,
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(items) => Some(items),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

/// Hierarchy relationship types written by the mapping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipKind {
    /// Class without inferred superclass, pointing at the root.
    IsA,
    /// Class pointing at one of its direct superclasses.
    PartOf,
}

impl RelationshipKind {
    /// Relationship type name as persisted.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsA => "isA",
            Self::PartOf => "partOf",
        }
    }

    /// Parses a persisted relationship type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "isA" => Some(Self::IsA),
            "partOf" => Some(Self::PartOf),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node as read back from committed storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    pub id: NodeId,
    pub key: String,
    pub labels: BTreeSet<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl StoredNode {
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_text)
    }

    #[must_use]
    pub fn text_list(&self, key: &str) -> Option<&[String]> {
        self.properties.get(key).and_then(PropertyValue::as_text_list)
    }
}

/// Relationship as read back from committed storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredRelationship {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: RelationshipKind,
}

/// Committed contents of a graph store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub nodes: Vec<StoredNode>,
    pub relationships: Vec<StoredRelationship>,
}

impl GraphSnapshot {
    #[must_use]
    pub fn node_by_key(&self, key: &str) -> Option<&StoredNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    /// Relationships leaving the given node, in creation order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &StoredRelationship> {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.from == node)
    }

    /// Relationships of one type.
    pub fn of_kind(&self, kind: RelationshipKind) -> impl Iterator<Item = &StoredRelationship> {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.kind == kind)
    }
}

/// Errors raised by graph store backends.
#[derive(Debug, Error)]
pub enum GraphStoreError {
    /// A node id was used that the transaction does not know.
    #[error("node `{0}` does not exist")]
    MissingNode(NodeId),
    /// Another node already carries the key.
    #[error("node key `{0}` already exists")]
    DuplicateKey(String),
    /// A persisted value could not be decoded.
    #[error("corrupt value for `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[cfg(feature = "with-db")]
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Property graph storage with key-indexed nodes and exclusive write
/// transactions.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Transaction type handed out by [`GraphStore::begin`].
    type Transaction: GraphTransaction;

    /// Opens a write transaction. Nothing written through it is visible in
    /// [`GraphStore::snapshot`] until it commits.
    async fn begin(&self) -> Result<Self::Transaction, GraphStoreError>;

    /// Reads the committed graph.
    async fn snapshot(&self) -> Result<GraphSnapshot, GraphStoreError>;
}

/// Write operations available inside a transaction.
#[async_trait]
pub trait GraphTransaction: Send {
    /// Looks a node up through the key index.
    async fn find_node(&mut self, key: &str) -> Result<Option<NodeId>, GraphStoreError>;

    /// Creates a node carrying `key` as its [`CLASS_NAME`] property.
    ///
    /// Implementors must reject keys that already exist.
    async fn create_node(&mut self, key: &str) -> Result<NodeId, GraphStoreError>;

    /// Sets or replaces a node property.
    async fn set_property(
        &mut self,
        node: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), GraphStoreError>;

    /// Adds a label to a node. Adding an existing label is a no-op.
    async fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), GraphStoreError>;

    /// Creates a typed relationship. Parallel relationships are allowed.
    async fn create_relationship(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: RelationshipKind,
    ) -> Result<(), GraphStoreError>;

    /// Makes every write of the transaction durable.
    async fn commit(self) -> Result<(), GraphStoreError>;

    /// Discards every write of the transaction.
    async fn rollback(self) -> Result<(), GraphStoreError>;
}

#[cfg(test)]
mod tests {
    use super::{PropertyValue, RelationshipKind};

    #[test]
    fn relationship_names_round_trip() {
        for kind in [RelationshipKind::IsA, RelationshipKind::PartOf] {
            assert_eq!(RelationshipKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(RelationshipKind::from_name("subClassOf"), None);
    }

    #[test]
    fn property_values_serialize_untagged() {
        let text = serde_json::to_string(&PropertyValue::from("Biology")).expect("text");
        assert_eq!(text, "\"Biology\"");
        let list = serde_json::to_string(&PropertyValue::from(vec![
            "Life science".to_string(),
            "Biology".to_string(),
        ]))
        .expect("list");
        assert_eq!(list, "[\"Life science\",\"Biology\"]");
        let decoded: PropertyValue = serde_json::from_str("[]").expect("empty list");
        assert_eq!(decoded, PropertyValue::TextList(vec![]));
    }
}
