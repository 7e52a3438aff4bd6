//! API state management for the REST server.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::entities::{platform_metadata, Role, User};
use crate::installer::{Configurator, InstallationWorkflow};
use crate::rest::error::ApiError;
use crate::storage::{FileStore, StorageBackend};

/// The requester resolved from the auth header
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: String,
    pub username: String,
    /// Granted by an admin role: see every owner's assets
    pub can_view_others: bool,
}

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    /// Step registry and accumulated configuration (wizard-mutated)
    pub configurator: Arc<RwLock<Configurator>>,
    pub workflow: Arc<InstallationWorkflow>,
    pub storage: Arc<dyn StorageBackend>,
    pub config: Arc<Config>,
}

impl ApiState {
    /// Create new API state from config
    pub fn new(config: Config) -> Self {
        let storage: Arc<dyn StorageBackend> =
            Arc::new(FileStore::new(config.data_path(), platform_metadata()));
        let configurator = Configurator::from_config(&config);
        let workflow = InstallationWorkflow::new(Arc::clone(&storage), config.fixtures_path());

        Self {
            configurator: Arc::new(RwLock::new(configurator)),
            workflow: Arc::new(workflow),
            storage,
            config: Arc::new(config),
        }
    }

    /// Database name the installer provisioned (or the default)
    pub async fn database(&self) -> String {
        let configurator = self.configurator.read().await;
        configurator
            .parameter_str("db_name")
            .filter(|n| !n.is_empty())
            .unwrap_or("campaigner")
            .to_string()
    }

    /// Resolve a requester by username and derive their permissions from
    /// the referenced role.
    pub async fn resolve_requester(&self, username: &str) -> Result<Requester, ApiError> {
        let database = self.database().await;

        let users = self.storage.list(&database, User::ENTITY).await?;
        let user: User = users
            .into_iter()
            .find(|u| u.get("username").and_then(|v| v.as_str()) == Some(username))
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| ApiError::Unauthorized(format!("Unknown user '{username}'")))?;

        let can_view_others = match self.storage.find(&database, Role::ENTITY, &user.role_id).await? {
            Some(record) => {
                let role: Role = serde_json::from_value(record)?;
                role.is_admin
            }
            None => false,
        };

        Ok(Requester {
            user_id: user.id,
            username: user.username,
            can_view_others,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.local_config = temp
            .path()
            .join("config/local.toml")
            .to_string_lossy()
            .to_string();
        config.paths.data = temp.path().join("data").to_string_lossy().to_string();
        config.paths.fixtures = temp.path().join("fixtures").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_api_state_new() {
        let temp = TempDir::new().unwrap();
        let state = ApiState::new(test_config(&temp));

        let configurator = state.configurator.read().await;
        assert_eq!(configurator.step_count(), 4);
    }

    #[tokio::test]
    async fn test_database_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let state = ApiState::new(test_config(&temp));
        assert_eq!(state.database().await, "campaigner");
    }

    #[tokio::test]
    async fn test_resolve_requester_unknown_user() {
        let temp = TempDir::new().unwrap();
        let state = ApiState::new(test_config(&temp));

        // Provision an empty schema so the lookup reaches the user list
        state.storage.execute_raw("CREATE DATABASE campaigner").await.unwrap();
        state
            .storage
            .create_schema("campaigner", &state.storage.metadata())
            .await
            .unwrap();

        let result = state.resolve_requester("ghost").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
