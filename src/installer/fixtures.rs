//! Fixture discovery and installation.
//!
//! A fixture file is a JSON array of contact fields. The configured
//! directory is scanned for `*.json`; finding none is a reported error,
//! never silent success. Installation purges existing rows first so a
//! re-install converges to the fixture set.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::entities::ContactField;
use crate::storage::{StorageBackend, StorageError};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not find any fixtures to load in: {0}")]
    NoFixtures(PathBuf),

    #[error("failed to parse fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Scan a directory for fixture files and parse them.
/// Files are visited in name order so loads are deterministic.
pub fn discover(dir: &Path) -> Result<Vec<(PathBuf, Vec<ContactField>)>, FixtureError> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect(),
        Err(_) => Vec::new(),
    };
    paths.sort();

    if paths.is_empty() {
        return Err(FixtureError::NoFixtures(dir.to_path_buf()));
    }

    let mut fixtures = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let fields: Vec<ContactField> =
            serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), fields = fields.len(), "fixture discovered");
        fixtures.push((path, fields));
    }

    Ok(fixtures)
}

/// Purge existing contact fields and load the fixture set.
pub async fn install(
    storage: &dyn StorageBackend,
    dir: &Path,
    database: &str,
) -> Result<usize, FixtureError> {
    let fixtures = discover(dir)?;

    let purged = storage.delete_all(database, ContactField::ENTITY).await?;
    debug!(purged, "existing contact fields purged");

    let mut loaded = 0;
    for (_, fields) in fixtures {
        for field in fields {
            storage
                .insert(database, ContactField::ENTITY, &field.alias, field.record())
                .await?;
            loaded += 1;
        }
    }

    info!(loaded, "contact field fixtures installed");
    Ok(loaded)
}
