//! Storage boundary for the installer and the entity API.
//!
//! The platform talks to its backing store through the [`StorageBackend`]
//! trait: entity-schema introspection, schema creation, a raw-statement
//! escape hatch, and generic record operations. Failures are classified
//! structurally so callers can tell a missing database from pre-existing
//! schema objects without inspecting driver message text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file;

pub use file::FileStore;

/// Storage failure classification
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target database does not exist (recoverable by creating it)
    #[error("database '{0}' does not exist")]
    DatabaseMissing(String),

    /// Schema objects already exist in the target database
    #[error("schema objects already exist")]
    SchemaExists,

    /// A referential or uniqueness constraint was violated
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The requested entity is not part of the schema
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// The raw statement could not be interpreted
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// A reference from one entity's field to another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Field on the referencing record holding the target id
    pub field: String,
    /// Entity the field points at
    pub entity: String,
}

/// Schema description for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name (e.g. "users")
    pub entity: String,
    /// Field names the entity carries
    pub fields: Vec<String>,
    /// Referential constraints enforced on insert
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl EntityMetadata {
    pub fn new(entity: &str, fields: &[&str]) -> Self {
        Self {
            entity: entity.to_string(),
            fields: fields.iter().map(ToString::to_string).collect(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, field: &str, entity: &str) -> Self {
        self.references.push(Reference {
            field: field.to_string(),
            entity: entity.to_string(),
        });
        self
    }
}

/// Backend abstraction over the platform's data store.
///
/// Operations are database-qualified: the backend serves a whole data root
/// and each call names the database it targets, mirroring a server-scoped
/// connection. Individual operations are atomic; there is no cross-call
/// transaction or rollback.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// List all known entity schemas
    fn metadata(&self) -> Vec<EntityMetadata>;

    /// Create the schema for the given metadata inside `database`
    async fn create_schema(
        &self,
        database: &str,
        metadata: &[EntityMetadata],
    ) -> Result<(), StorageError>;

    /// Escape hatch for statements outside the record API.
    /// Understands `CREATE DATABASE <name>`.
    async fn execute_raw(&self, statement: &str) -> Result<(), StorageError>;

    /// Insert one record; enforces the entity's referential constraints
    async fn insert(
        &self,
        database: &str,
        entity: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError>;

    /// Fetch one record by id
    async fn find(
        &self,
        database: &str,
        entity: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StorageError>;

    /// List all records of an entity
    async fn list(&self, database: &str, entity: &str) -> Result<Vec<serde_json::Value>, StorageError>;

    /// Delete-mode purge: remove all records of an entity, returning the count
    async fn delete_all(&self, database: &str, entity: &str) -> Result<usize, StorageError>;
}
