//! Directory-backed storage implementation.
//!
//! Layout: `<root>/<database>/<entity>/<id>.json` with a `schema.toml`
//! manifest marking a provisioned schema. A database is a directory; the
//! raw `CREATE DATABASE` statement creates it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EntityMetadata, StorageBackend, StorageError};

const SCHEMA_MANIFEST: &str = "schema.toml";

/// Serialized form of the schema manifest
#[derive(Debug, Serialize, Deserialize)]
struct SchemaManifest {
    entities: Vec<EntityMetadata>,
}

/// File-per-record store rooted at a data directory
pub struct FileStore {
    root: PathBuf,
    metadata: Vec<EntityMetadata>,
}

impl FileStore {
    /// Create a store over `root` serving the given entity schemas
    pub fn new(root: impl Into<PathBuf>, metadata: Vec<EntityMetadata>) -> Self {
        Self {
            root: root.into(),
            metadata,
        }
    }

    fn database_path(&self, database: &str) -> PathBuf {
        self.root.join(database)
    }

    fn entity_path(&self, database: &str, entity: &str) -> PathBuf {
        self.database_path(database).join(entity)
    }

    fn record_path(&self, database: &str, entity: &str, id: &str) -> PathBuf {
        self.entity_path(database, entity).join(format!("{id}.json"))
    }

    fn require_database(&self, database: &str) -> Result<PathBuf, StorageError> {
        let path = self.database_path(database);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(StorageError::DatabaseMissing(database.to_string()))
        }
    }

    fn require_entity(&self, entity: &str) -> Result<&EntityMetadata, StorageError> {
        self.metadata
            .iter()
            .find(|m| m.entity == entity)
            .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))
    }

    fn check_references(
        &self,
        database: &str,
        meta: &EntityMetadata,
        record: &serde_json::Value,
    ) -> Result<(), StorageError> {
        for reference in &meta.references {
            let Some(target_id) = record.get(&reference.field).and_then(|v| v.as_str()) else {
                continue;
            };
            let target = self.record_path(database, &reference.entity, target_id);
            if !target.is_file() {
                return Err(StorageError::Constraint(format!(
                    "{}.{} references missing {} '{}'",
                    meta.entity, reference.field, reference.entity, target_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileStore {
    fn metadata(&self) -> Vec<EntityMetadata> {
        self.metadata.clone()
    }

    async fn create_schema(
        &self,
        database: &str,
        metadata: &[EntityMetadata],
    ) -> Result<(), StorageError> {
        let db_path = self.require_database(database)?;

        let manifest_path = db_path.join(SCHEMA_MANIFEST);
        if manifest_path.exists() {
            return Err(StorageError::SchemaExists);
        }

        for meta in metadata {
            tokio::fs::create_dir_all(self.entity_path(database, &meta.entity)).await?;
        }

        let manifest = SchemaManifest {
            entities: metadata.to_vec(),
        };
        let toml = toml::to_string_pretty(&manifest)
            .map_err(|e| StorageError::UnsupportedStatement(e.to_string()))?;
        tokio::fs::write(&manifest_path, toml).await?;

        debug!(database, entities = metadata.len(), "schema created");
        Ok(())
    }

    async fn execute_raw(&self, statement: &str) -> Result<(), StorageError> {
        let trimmed = statement.trim();
        if let Some(name) = trimmed
            .strip_prefix("CREATE DATABASE ")
            .or_else(|| trimmed.strip_prefix("create database "))
        {
            let name = name.trim();
            if name.is_empty() || name.contains(std::path::is_separator) {
                return Err(StorageError::UnsupportedStatement(statement.to_string()));
            }
            tokio::fs::create_dir_all(self.database_path(name)).await?;
            debug!(database = name, "database created");
            return Ok(());
        }

        Err(StorageError::UnsupportedStatement(statement.to_string()))
    }

    async fn insert(
        &self,
        database: &str,
        entity: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError> {
        self.require_database(database)?;
        let meta = self.require_entity(entity)?;
        self.check_references(database, meta, &record)?;

        let path = self.record_path(database, entity, id);
        if path.exists() {
            return Err(StorageError::Constraint(format!(
                "duplicate {entity} id '{id}'"
            )));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    async fn find(
        &self,
        database: &str,
        entity: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        self.require_database(database)?;
        self.require_entity(entity)?;

        let path = self.record_path(database, entity, id);
        if !path.is_file() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn list(&self, database: &str, entity: &str) -> Result<Vec<serde_json::Value>, StorageError> {
        self.require_database(database)?;
        self.require_entity(entity)?;

        let dir = self.entity_path(database, entity);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            records.push(serde_json::from_str(&content)?);
        }

        // Directory order is platform-dependent; keep listings stable
        records.sort_by(|a, b| {
            let key = |v: &serde_json::Value| {
                v.get("id")
                    .or_else(|| v.get("alias"))
                    .and_then(|id| id.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            key(a).cmp(&key(b))
        });
        Ok(records)
    }

    async fn delete_all(&self, database: &str, entity: &str) -> Result<usize, StorageError> {
        self.require_database(database)?;
        self.require_entity(entity)?;

        let dir = self.entity_path(database, entity);
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_metadata() -> Vec<EntityMetadata> {
        vec![
            EntityMetadata::new("roles", &["id", "name"]),
            EntityMetadata::new("users", &["id", "username", "role_id"])
                .with_reference("role_id", "roles"),
        ]
    }

    fn store(temp: &TempDir) -> FileStore {
        FileStore::new(temp.path(), test_metadata())
    }

    #[tokio::test]
    async fn test_create_schema_requires_database() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = store.create_schema("missing", &store.metadata()).await;
        assert!(matches!(result, Err(StorageError::DatabaseMissing(name)) if name == "missing"));
    }

    #[tokio::test]
    async fn test_create_schema_twice_is_schema_exists() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.execute_raw("CREATE DATABASE app").await.unwrap();
        store.create_schema("app", &store.metadata()).await.unwrap();

        let result = store.create_schema("app", &store.metadata()).await;
        assert!(matches!(result, Err(StorageError::SchemaExists)));
    }

    #[tokio::test]
    async fn test_insert_enforces_references() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.execute_raw("CREATE DATABASE app").await.unwrap();
        store.create_schema("app", &store.metadata()).await.unwrap();

        // User referencing an absent role is rejected
        let result = store
            .insert("app", "users", "u1", json!({"id": "u1", "role_id": "r1"}))
            .await;
        assert!(matches!(result, Err(StorageError::Constraint(_))));

        // After the role exists the insert passes
        store
            .insert("app", "roles", "r1", json!({"id": "r1", "name": "Admin"}))
            .await
            .unwrap();
        store
            .insert("app", "users", "u1", json!({"id": "u1", "role_id": "r1"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.execute_raw("CREATE DATABASE app").await.unwrap();
        store.create_schema("app", &store.metadata()).await.unwrap();

        store
            .insert("app", "roles", "r1", json!({"id": "r1"}))
            .await
            .unwrap();
        let result = store.insert("app", "roles", "r1", json!({"id": "r1"})).await;
        assert!(matches!(result, Err(StorageError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_list_and_purge() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.execute_raw("CREATE DATABASE app").await.unwrap();
        store.create_schema("app", &store.metadata()).await.unwrap();

        for id in ["r2", "r1"] {
            store
                .insert("app", "roles", id, json!({"id": id}))
                .await
                .unwrap();
        }

        let found = store.find("app", "roles", "r1").await.unwrap();
        assert!(found.is_some());
        assert!(store.find("app", "roles", "r9").await.unwrap().is_none());

        let listed = store.list("app", "roles").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["id"], "r1"); // sorted by id

        let removed = store.delete_all("app", "roles").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.list("app", "roles").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entity() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.execute_raw("CREATE DATABASE app").await.unwrap();

        let result = store.list("app", "campaigns").await;
        assert!(matches!(result, Err(StorageError::UnknownEntity(_))));
    }

    #[tokio::test]
    async fn test_execute_raw_rejects_other_statements() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = store.execute_raw("DROP DATABASE app").await;
        assert!(matches!(result, Err(StorageError::UnsupportedStatement(_))));
    }
}
