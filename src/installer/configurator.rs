//! Step registry and configuration persistence.
//!
//! The configurator owns the ordered step list and the parameters
//! accumulated across the wizard. Parameters merge monotonically in memory
//! and persist to the local settings file; durability between requests comes
//! only from that file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::steps::{default_steps, InstallStep};
use super::InstallerError;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An environment probe shown on the check step
#[derive(Debug, Clone, Serialize)]
pub struct Requirement {
    pub key: String,
    pub label: String,
    pub satisfied: bool,
}

impl Requirement {
    fn new(key: &str, label: &str, satisfied: bool) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            satisfied,
        }
    }
}

pub struct Configurator {
    steps: Vec<InstallStep>,
    parameters: BTreeMap<String, toml::Value>,
    path: PathBuf,
    data_dir: PathBuf,
    fixtures_dir: PathBuf,
}

impl Configurator {
    /// Build the registry and read any previously-persisted parameters.
    /// A missing or partial settings file is not an error; absent keys fall
    /// back to defaults downstream.
    pub fn new(path: PathBuf, data_dir: PathBuf, fixtures_dir: PathBuf) -> Self {
        let parameters = read_parameters(&path);
        Self {
            steps: default_steps(),
            parameters,
            path,
            data_dir,
            fixtures_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.local_config_path(),
            config.data_path(),
            config.fixtures_path(),
        )
    }

    pub fn step(&self, index: usize) -> Result<&InstallStep, InstallerError> {
        self.steps.get(index).ok_or(InstallerError::StepNotFound {
            index,
            count: self.steps.len(),
        })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Merge parameters into the accumulated set. Same-named keys are
    /// overwritten; everything else persists.
    pub fn merge_parameters(&mut self, parameters: BTreeMap<String, toml::Value>) {
        self.parameters.extend(parameters);
    }

    /// Current parameter snapshot
    pub fn render(&self) -> BTreeMap<String, toml::Value> {
        self.parameters.clone()
    }

    /// String parameter accessor
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(toml::Value::as_str)
    }

    /// Persist the full parameter set.
    ///
    /// The write is atomic from the caller's perspective: the serialized
    /// configuration lands in a temp file next to the target and is renamed
    /// over it, so readers see either the old file or the new one.
    pub fn write(&self) -> Result<(), ConfigWriteError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(&self.parameters)?;
        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, toml_str)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), keys = self.parameters.len(), "configuration written");
        Ok(())
    }

    /// Whether the settings file (or the directory it would be created in)
    /// accepts writes
    pub fn is_file_writable(&self) -> bool {
        if self.path.exists() {
            fs::OpenOptions::new().append(true).open(&self.path).is_ok()
        } else {
            nearest_existing_dir(&self.path).is_some()
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Hard requirements for installation to proceed
    pub fn requirements(&self) -> Vec<Requirement> {
        vec![
            Requirement::new(
                "config.writable",
                "Settings file location is writable",
                self.is_file_writable(),
            ),
            Requirement::new(
                "data.dir",
                "Data directory exists or can be created",
                nearest_existing_dir(&self.data_dir.join("probe")).is_some(),
            ),
        ]
    }

    /// Recommended-but-optional environment settings
    pub fn optional_settings(&self) -> Vec<Requirement> {
        let fixtures_present = fs::read_dir(&self.fixtures_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .any(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            })
            .unwrap_or(false);

        vec![
            Requirement::new(
                "fixtures.present",
                "Fixture definitions available for default data",
                fixtures_present,
            ),
            Requirement::new(
                "secret.configured",
                "Site secret generated",
                self.parameters.contains_key("secret"),
            ),
        ]
    }
}

fn read_parameters(path: &Path) -> BTreeMap<String, toml::Value> {
    let Ok(content) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    match content.parse::<toml::Table>() {
        Ok(table) => table.into_iter().collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable settings file");
            BTreeMap::new()
        }
    }
}

/// Walk up from `path` to the nearest existing ancestor, which must be a
/// directory for the path to be creatable
fn nearest_existing_dir(path: &Path) -> Option<&Path> {
    path.ancestors()
        .skip(1)
        .find(|p| p.exists())
        .filter(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn configurator(temp: &TempDir) -> Configurator {
        Configurator::new(
            temp.path().join("config/local.toml"),
            temp.path().join("data"),
            temp.path().join("fixtures"),
        )
    }

    fn string_param(key: &str, value: &str) -> BTreeMap<String, toml::Value> {
        BTreeMap::from([(key.to_string(), toml::Value::String(value.to_string()))])
    }

    #[test]
    fn test_step_lookup_in_range() {
        let temp = TempDir::new().unwrap();
        let configurator = configurator(&temp);

        for i in 0..configurator.step_count() {
            assert_eq!(configurator.step(i).unwrap().index, i);
        }
    }

    #[test]
    fn test_step_lookup_out_of_range() {
        let temp = TempDir::new().unwrap();
        let configurator = configurator(&temp);

        let count = configurator.step_count();
        let err = configurator.step(count).unwrap_err();
        assert!(matches!(err, InstallerError::StepNotFound { index, .. } if index == count));
    }

    #[test]
    fn test_merge_is_monotonic() {
        let temp = TempDir::new().unwrap();
        let mut configurator = configurator(&temp);

        configurator.merge_parameters(string_param("db_name", "campaigner"));
        configurator.merge_parameters(string_param("secret", "abc"));

        let rendered = configurator.render();
        assert_eq!(rendered["db_name"].as_str(), Some("campaigner"));
        assert_eq!(rendered["secret"].as_str(), Some("abc"));

        // Same key overwrites, other keys persist
        configurator.merge_parameters(string_param("db_name", "other"));
        let rendered = configurator.render();
        assert_eq!(rendered["db_name"].as_str(), Some("other"));
        assert_eq!(rendered["secret"].as_str(), Some("abc"));
    }

    #[test]
    fn test_write_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut configurator = configurator(&temp);

        configurator.merge_parameters(string_param("db_name", "campaigner"));
        configurator.write().unwrap();

        // No temp file left behind
        assert!(!temp.path().join("config/local.toml.tmp").exists());

        let reloaded = Configurator::new(
            temp.path().join("config/local.toml"),
            temp.path().join("data"),
            temp.path().join("fixtures"),
        );
        assert_eq!(reloaded.parameter_str("db_name"), Some("campaigner"));
    }

    #[test]
    fn test_is_file_writable_before_creation() {
        let temp = TempDir::new().unwrap();
        let configurator = configurator(&temp);
        assert!(configurator.is_file_writable());
    }

    #[test]
    fn test_requirements_are_pure_data() {
        let temp = TempDir::new().unwrap();
        let configurator = configurator(&temp);

        let majors = configurator.requirements();
        assert!(majors.iter().all(|r| r.satisfied));

        // No fixtures dir yet: the optional probe reports it
        let minors = configurator.optional_settings();
        let fixtures = minors.iter().find(|r| r.key == "fixtures.present").unwrap();
        assert!(!fixtures.satisfied);
    }
}
