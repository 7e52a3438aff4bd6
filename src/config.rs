use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    7300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Installer-managed settings file (written incrementally by the wizard)
    pub local_config: String,
    /// Root directory the storage backend keeps databases under
    pub data: String,
    /// Directory scanned for fixture definitions
    pub fixtures: String,
    /// State directory (logs live under it)
    pub state: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file (false = stderr)
    #[serde(default)]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the server runs before installation
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/campaigner/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("campaigner").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with CAMPAIGNER_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGNER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to the installer-managed settings file
    pub fn local_config_path(&self) -> PathBuf {
        self.resolve(&self.paths.local_config)
    }

    /// Get absolute path to the storage data root
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.paths.data)
    }

    /// Get absolute path to the fixtures directory
    pub fn fixtures_path(&self) -> PathBuf {
        self.resolve(&self.paths.fixtures)
    }

    /// Get absolute path to the state directory
    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.paths.state)
    }

    /// Get absolute path to the logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            paths: PathsConfig {
                local_config: "config/local.toml".to_string(),
                data: "data".to_string(),
                fixtures: "fixtures".to_string(),
                state: ".campaigner".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 7300);
        assert_eq!(config.paths.local_config, "config/local.toml");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_paths_resolve_relative() {
        let config = Config::default();
        assert!(config.local_config_path().is_absolute());
        assert!(config.fixtures_path().ends_with("fixtures"));
        assert!(config.logs_path().ends_with("logs"));
    }

    #[test]
    fn test_paths_keep_absolute() {
        let mut config = Config::default();
        config.paths.data = "/var/lib/campaigner".to_string();
        assert_eq!(config.data_path(), PathBuf::from("/var/lib/campaigner"));
    }
}
