use std::{collections::BTreeMap, path::Path, str::FromStr};

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, Sqlite, SqlitePool, Transaction,
};
use tracing::debug;

use super::domain::{
    GraphSnapshot, GraphStore, GraphStoreError, GraphTransaction, NodeId, PropertyValue,
    RelationshipKind, StoredNode, StoredRelationship, CLASS_NAME,
};

/// File created inside the store directory.
pub const DATABASE_FILE: &str = "graph.sqlite";

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS nodes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        class_name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS node_labels (
        node_id INTEGER NOT NULL REFERENCES nodes(id),
        label TEXT NOT NULL,
        PRIMARY KEY (node_id, label)
    )",
    "CREATE TABLE IF NOT EXISTS node_properties (
        node_id INTEGER NOT NULL REFERENCES nodes(id),
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (node_id, key)
    )",
    "CREATE TABLE IF NOT EXISTS relationships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_node INTEGER NOT NULL REFERENCES nodes(id),
        end_node INTEGER NOT NULL REFERENCES nodes(id),
        type TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS relationships_start_node ON relationships (start_node)",
];

/// Graph store persisted in a SQLite database.
///
/// The key index is the `UNIQUE` constraint on `nodes.class_name`. The pool
/// holds a single connection, so at most one transaction is open at a time.
#[derive(Clone)]
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

impl SqliteGraphStore {
    /// Opens (creating if needed) the store inside `directory`.
    pub async fn open(directory: &Path) -> Result<Self, GraphStoreError> {
        std::fs::create_dir_all(directory)?;
        let options = SqliteConnectOptions::new()
            .filename(directory.join(DATABASE_FILE))
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect(options).await
    }

    /// Opens a store that lives as long as the returned value.
    pub async fn in_memory() -> Result<Self, GraphStoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, GraphStoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("graph_store_schema_ready");
        Ok(Self { pool })
    }
}

/// Transaction handed out by [`SqliteGraphStore`].
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteTransaction {
    async fn ensure_node(&mut self, node: NodeId) -> Result<(), GraphStoreError> {
        let found = sqlx::query("SELECT 1 FROM nodes WHERE id = ?")
            .bind(node.0)
            .fetch_optional(&mut *self.tx)
            .await?;
        found
            .map(|_| ())
            .ok_or(GraphStoreError::MissingNode(node))
    }

    async fn upsert_property(
        &mut self,
        node: NodeId,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), GraphStoreError> {
        let encoded = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO node_properties (node_id, key, value) VALUES (?, ?, ?)
             ON CONFLICT (node_id, key) DO UPDATE SET value = excluded.value",
        )
        .bind(node.0)
        .bind(key)
        .bind(encoded)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    type Transaction = SqliteTransaction;

    async fn begin(&self) -> Result<Self::Transaction, GraphStoreError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteTransaction { tx })
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, GraphStoreError> {
        let mut nodes: BTreeMap<i64, StoredNode> = BTreeMap::new();
        for row in sqlx::query("SELECT id, class_name FROM nodes ORDER BY id")
            .fetch_all(&self.pool)
            .await?
        {
            let id: i64 = row.try_get("id")?;
            nodes.insert(
                id,
                StoredNode {
                    id: NodeId(id),
                    key: row.try_get("class_name")?,
                    labels: Default::default(),
                    properties: BTreeMap::new(),
                },
            );
        }

        for row in sqlx::query("SELECT node_id, label FROM node_labels")
            .fetch_all(&self.pool)
            .await?
        {
            let id: i64 = row.try_get("node_id")?;
            if let Some(node) = nodes.get_mut(&id) {
                node.labels.insert(row.try_get("label")?);
            }
        }

        for row in sqlx::query("SELECT node_id, key, value FROM node_properties")
            .fetch_all(&self.pool)
            .await?
        {
            let id: i64 = row.try_get("node_id")?;
            let key: String = row.try_get("key")?;
            let raw: String = row.try_get("value")?;
            let value: PropertyValue =
                serde_json::from_str(&raw).map_err(|err| GraphStoreError::Corrupt {
                    key: key.clone(),
                    reason: err.to_string(),
                })?;
            if let Some(node) = nodes.get_mut(&id) {
                node.properties.insert(key, value);
            }
        }

        let mut relationships = Vec::new();
        for row in sqlx::query("SELECT start_node, end_node, type FROM relationships ORDER BY id")
            .fetch_all(&self.pool)
            .await?
        {
            let name: String = row.try_get("type")?;
            let kind = RelationshipKind::from_name(&name).ok_or_else(|| {
                GraphStoreError::Corrupt {
                    key: "type".to_string(),
                    reason: format!("unknown relationship type `{name}`"),
                }
            })?;
            relationships.push(StoredRelationship {
                from: NodeId(row.try_get("start_node")?),
                to: NodeId(row.try_get("end_node")?),
                kind,
            });
        }

        Ok(GraphSnapshot {
            nodes: nodes.into_values().collect(),
            relationships,
        })
    }
}

#[async_trait]
impl GraphTransaction for SqliteTransaction {
    async fn find_node(&mut self, key: &str) -> Result<Option<NodeId>, GraphStoreError> {
        let row = sqlx::query("SELECT id FROM nodes WHERE class_name = ?")
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(|row| row.try_get::<i64, _>("id").map(NodeId))
            .transpose()
            .map_err(GraphStoreError::from)
    }

    async fn create_node(&mut self, key: &str) -> Result<NodeId, GraphStoreError> {
        if self.find_node(key).await?.is_some() {
            return Err(GraphStoreError::DuplicateKey(key.to_owned()));
        }
        let id = sqlx::query("INSERT INTO nodes (class_name) VALUES (?)")
            .bind(key)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();
        let node = NodeId(id);
        self.upsert_property(node, CLASS_NAME, &PropertyValue::from(key))
            .await?;
        Ok(node)
    }

    async fn set_property(
        &mut self,
        node: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), GraphStoreError> {
        self.ensure_node(node).await?;
        self.upsert_property(node, key, &value).await
    }

    async fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), GraphStoreError> {
        self.ensure_node(node).await?;
        sqlx::query("INSERT OR IGNORE INTO node_labels (node_id, label) VALUES (?, ?)")
            .bind(node.0)
            .bind(label)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn create_relationship(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: RelationshipKind,
    ) -> Result<(), GraphStoreError> {
        self.ensure_node(from).await?;
        self.ensure_node(to).await?;
        sqlx::query("INSERT INTO relationships (start_node, end_node, type) VALUES (?, ?, ?)")
            .bind(from.0)
            .bind(to.0)
            .bind(kind.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), GraphStoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), GraphStoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
