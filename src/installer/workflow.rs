//! The sequential installation workflow.
//!
//! Each request carries the step index; the workflow is a pure function of
//! `(index, method, payload)` plus the settings file and the storage
//! backend, so a retried request replays safely. A failed step re-renders
//! itself with flashes and never advances; there is no cross-step rollback.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use super::configurator::{Configurator, Requirement};
use super::fixtures;
use super::flash::FlashMessage;
use super::steps::{FieldError, FieldSchema, InstallStep, StepKind};
use super::InstallerError;
use crate::entities::{Role, User};
use crate::storage::{StorageBackend, StorageError};

const DEFAULT_DATABASE: &str = "campaigner";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// A step form to render
#[derive(Debug, Serialize)]
pub struct StepView {
    pub index: usize,
    pub count: usize,
    pub key: String,
    pub title: String,
    pub template: String,
    pub fields: Vec<FieldSchema>,
    pub errors: Vec<FieldError>,
    pub flashes: Vec<FlashMessage>,
    pub requirements: Vec<Requirement>,
    pub optional_settings: Vec<Requirement>,
}

/// The completion screen
#[derive(Debug, Serialize)]
pub struct FinalView {
    pub parameters: BTreeMap<String, toml::Value>,
    pub config_path: String,
    pub is_writable: bool,
    pub flashes: Vec<FlashMessage>,
}

/// What the transport layer should render next
#[derive(Debug, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum RenderDirective {
    Step(StepView),
    Final(FinalView),
}

pub struct InstallationWorkflow {
    storage: Arc<dyn StorageBackend>,
    fixtures_dir: PathBuf,
}

impl InstallationWorkflow {
    pub fn new(storage: Arc<dyn StorageBackend>, fixtures_dir: PathBuf) -> Self {
        Self {
            storage,
            fixtures_dir,
        }
    }

    /// Drive one wizard request.
    ///
    /// GET renders the step's form unmodified. POST binds and validates the
    /// payload, persists the step's parameters, runs its side effect, then
    /// advances - or re-renders the same step with flashes on any failure.
    pub async fn handle_step(
        &self,
        configurator: &mut Configurator,
        index: usize,
        method: RequestMethod,
        payload: &BTreeMap<String, String>,
    ) -> Result<RenderDirective, InstallerError> {
        let step = configurator.step(index)?.clone();

        if method == RequestMethod::Get {
            return Ok(render_step(configurator, &step, Vec::new(), Vec::new()));
        }

        let errors = step.validate(payload);
        if !errors.is_empty() {
            return Ok(render_step(configurator, &step, errors, Vec::new()));
        }

        configurator.merge_parameters(step.parameters(payload));
        if let Err(e) = configurator.write() {
            warn!(step = step.key, error = %e, "failed to persist configuration");
            return Ok(render_step(
                configurator,
                &step,
                Vec::new(),
                vec![FlashMessage::error(
                    "campaigner.installer.error.writing.configuration",
                )],
            ));
        }

        // Post-step processing
        let result = match step.kind {
            StepKind::Database => {
                self.perform_database_installation(configurator, &step, payload)
                    .await
            }
            StepKind::User => self.perform_user_addition(configurator, payload).await,
            StepKind::Check | StepKind::Email => Ok(()),
        };

        if let Err(flashes) = result {
            return Ok(render_step(configurator, &step, Vec::new(), flashes));
        }

        info!(step = step.key, index, "install step completed");
        let next = index + 1;

        if next < configurator.step_count() {
            let next_step = configurator.step(next)?.clone();
            return Ok(render_step(configurator, &next_step, Vec::new(), Vec::new()));
        }

        // Post-processing once installation is complete
        Ok(self.finalize(configurator).await)
    }

    /// Render the completion screen without re-running finalization
    pub fn final_screen(&self, configurator: &Configurator) -> RenderDirective {
        RenderDirective::Final(FinalView {
            parameters: configurator.render(),
            config_path: configurator.config_path().display().to_string(),
            is_writable: configurator.is_file_writable(),
            flashes: Vec::new(),
        })
    }

    /// Provision the database schema, creating the database itself if the
    /// backend reports it missing (one bounded retry).
    async fn perform_database_installation(
        &self,
        configurator: &mut Configurator,
        step: &InstallStep,
        payload: &BTreeMap<String, String>,
    ) -> Result<(), Vec<FlashMessage>> {
        let metadata = self.storage.metadata();
        if metadata.is_empty() {
            return Err(vec![FlashMessage::error(
                "campaigner.installer.error.no.metadata",
            )]);
        }

        let database = configurator
            .parameter_str("db_name")
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
            .to_string();

        match self.storage.create_schema(&database, &metadata).await {
            Ok(()) => Ok(()),
            Err(StorageError::DatabaseMissing(_)) => {
                info!(database = %database, "database missing, attempting to create it");
                self.create_database_then_schema(configurator, step, payload, &database, &metadata)
                    .await
                    .map_err(|e| {
                        vec![FlashMessage::error_with(
                            "campaigner.installer.error.creating.database",
                            &[("%exception%", &e.to_string())],
                        )]
                    })
            }
            Err(e @ StorageError::SchemaExists) => Err(vec![FlashMessage::error_with(
                "campaigner.installer.error.database.exists",
                &[("%exception%", &e.to_string())],
            )]),
            Err(e) => Err(vec![FlashMessage::error_with(
                "campaigner.installer.error.creating.database",
                &[("%exception%", &e.to_string())],
            )]),
        }
    }

    /// The retry path: clear the database name in the persisted settings,
    /// create the database through the raw escape hatch, restore the name,
    /// and try schema creation once more. Any failure here is terminal for
    /// the step.
    async fn create_database_then_schema(
        &self,
        configurator: &mut Configurator,
        step: &InstallStep,
        payload: &BTreeMap<String, String>,
        database: &str,
        metadata: &[crate::storage::EntityMetadata],
    ) -> anyhow::Result<()> {
        let mut cleared = step.parameters(payload);
        cleared.insert("db_name".to_string(), toml::Value::String(String::new()));
        configurator.merge_parameters(cleared);
        configurator.write()?;

        self.storage
            .execute_raw(&format!("CREATE DATABASE {database}"))
            .await?;

        configurator.merge_parameters(step.parameters(payload));
        configurator.write()?;

        self.storage.create_schema(database, metadata).await?;
        Ok(())
    }

    /// Create the admin role, then the admin user referencing it. The role
    /// is persisted first; the backing store enforces the reference.
    async fn perform_user_addition(
        &self,
        configurator: &Configurator,
        payload: &BTreeMap<String, String>,
    ) -> Result<(), Vec<FlashMessage>> {
        let database = self.database_name(configurator);

        let attempt: Result<(), StorageError> = async {
            let role = Role::new(
                "Administrator",
                "Full access to every part of the system",
                true,
            );
            self.storage
                .insert(&database, Role::ENTITY, &role.id, role.record())
                .await?;

            let value = |name: &str| payload.get(name).cloned().unwrap_or_default();
            let user = User::new(
                &value("firstname"),
                &value("lastname"),
                &value("username"),
                &value("email"),
                &value("password"),
                &role.id,
            );
            self.storage
                .insert(&database, User::ENTITY, &user.id, user.record())
                .await?;

            info!(username = %user.username, "administrative user created");
            Ok(())
        }
        .await;

        attempt.map_err(|e| {
            vec![FlashMessage::error_with(
                "campaigner.installer.error.creating.user",
                &[("%exception%", &e.to_string())],
            )]
        })
    }

    /// The one-time finalize sequence: fixture load, secret generation, and
    /// a last configuration write. Failures surface as flashes but never
    /// block the completion screen.
    async fn finalize(&self, configurator: &mut Configurator) -> RenderDirective {
        let mut flashes = Vec::new();

        if let Err(flash) = self.perform_field_fixture_install(configurator).await {
            flashes.extend(flash);
        }

        let secret = generate_secret();
        configurator.merge_parameters(BTreeMap::from([(
            "secret".to_string(),
            toml::Value::String(secret),
        )]));

        if let Err(e) = configurator.write() {
            warn!(error = %e, "failed to persist configuration during finalize");
            flashes.push(FlashMessage::error(
                "campaigner.installer.error.writing.configuration",
            ));
        }

        info!("installation complete");
        RenderDirective::Final(FinalView {
            parameters: configurator.render(),
            config_path: configurator.config_path().display().to_string(),
            is_writable: configurator.is_file_writable(),
            flashes,
        })
    }

    async fn perform_field_fixture_install(
        &self,
        configurator: &Configurator,
    ) -> Result<(), Vec<FlashMessage>> {
        let database = self.database_name(configurator);
        fixtures::install(self.storage.as_ref(), &self.fixtures_dir, &database)
            .await
            .map(|_| ())
            .map_err(|e| {
                vec![FlashMessage::error_with(
                    "campaigner.installer.error.adding.fields",
                    &[("%exception%", &e.to_string())],
                )]
            })
    }

    fn database_name(&self, configurator: &Configurator) -> String {
        configurator
            .parameter_str("db_name")
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
            .to_string()
    }
}

fn render_step(
    configurator: &Configurator,
    step: &InstallStep,
    errors: Vec<FieldError>,
    flashes: Vec<FlashMessage>,
) -> RenderDirective {
    RenderDirective::Step(StepView {
        index: step.index,
        count: configurator.step_count(),
        key: step.key.to_string(),
        title: step.title.to_string(),
        template: step.template.to_string(),
        fields: step.fields.clone(),
        errors,
        flashes,
        requirements: configurator.requirements(),
        optional_settings: configurator.optional_settings(),
    })
}

/// Random site secret: a digest over a freshly generated UUID
fn generate_secret() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::platform_metadata;
    use crate::storage::FileStore;
    use tempfile::TempDir;

    fn setup(temp: &TempDir) -> (InstallationWorkflow, Configurator) {
        let fixtures_dir = temp.path().join("fixtures");
        std::fs::create_dir_all(&fixtures_dir).unwrap();
        std::fs::write(
            fixtures_dir.join("contact_fields.json"),
            r#"[{"alias": "email", "label": "Email", "field_type": "email",
                 "field_group": "core", "is_required": true, "is_unique": true, "order": 1}]"#,
        )
        .unwrap();

        let storage = Arc::new(FileStore::new(temp.path().join("data"), platform_metadata()));
        let workflow = InstallationWorkflow::new(storage, fixtures_dir);
        let configurator = Configurator::new(
            temp.path().join("config/local.toml"),
            temp.path().join("data"),
            temp.path().join("fixtures"),
        );
        (workflow, configurator)
    }

    fn payload(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_renders_form_unmodified() {
        let temp = TempDir::new().unwrap();
        let (workflow, mut configurator) = setup(&temp);

        let directive = workflow
            .handle_step(&mut configurator, 0, RequestMethod::Get, &BTreeMap::new())
            .await
            .unwrap();

        let RenderDirective::Step(view) = directive else {
            panic!("expected step view");
        };
        assert_eq!(view.index, 0);
        assert_eq!(view.count, 4);
        assert!(view.errors.is_empty());
        assert!(view.flashes.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_step_index() {
        let temp = TempDir::new().unwrap();
        let (workflow, mut configurator) = setup(&temp);

        let result = workflow
            .handle_step(&mut configurator, 99, RequestMethod::Get, &BTreeMap::new())
            .await;
        assert!(matches!(
            result,
            Err(InstallerError::StepNotFound { index: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_payload_rerenders_same_step() {
        let temp = TempDir::new().unwrap();
        let (workflow, mut configurator) = setup(&temp);

        let directive = workflow
            .handle_step(
                &mut configurator,
                2,
                RequestMethod::Post,
                &payload(&[("firstname", "Ada")]),
            )
            .await
            .unwrap();

        let RenderDirective::Step(view) = directive else {
            panic!("expected step view");
        };
        assert_eq!(view.index, 2);
        assert!(!view.errors.is_empty());
        // No user was created
        assert!(!temp.path().join("data/campaigner/users").exists());
    }

    #[tokio::test]
    async fn test_check_step_advances_to_database() {
        let temp = TempDir::new().unwrap();
        let (workflow, mut configurator) = setup(&temp);

        let directive = workflow
            .handle_step(&mut configurator, 0, RequestMethod::Post, &BTreeMap::new())
            .await
            .unwrap();

        let RenderDirective::Step(view) = directive else {
            panic!("expected step view");
        };
        assert_eq!(view.index, 1);
        assert_eq!(view.key, "database");
    }

    #[tokio::test]
    async fn test_secret_is_random_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
