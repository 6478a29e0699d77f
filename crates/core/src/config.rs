//! Layered application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::environment::loader::DEFAULT_EXTENSION;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "gridrail";
/// Prefix of environment variable overrides, e.g. `GRIDRAIL_LOG_DIR`.
pub const ENV_PREFIX: &str = "GRIDRAIL";

const DEFAULT_CONFIG: &str = r#"# gridrail configuration
#
# Every key can be overridden with a GRIDRAIL_<KEY> environment variable.

# Where compile reports are stored.
# report_root = "/path/to/reports"

# Directory receiving the CLI log file.
log_dir = "logs"

# Extension of fact files picked up when checking a directory.
instance_extension = "lp"
"#;

/// Settings shared by the library and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for saved compile reports.
    pub report_root: PathBuf,
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Extension of fact files during discovery.
    pub instance_extension: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_root: default_report_root(),
            log_dir: PathBuf::from("logs"),
            instance_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load defaults, then `path` if it exists, then `GRIDRAIL_*` variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default(
                "report_root",
                defaults.report_root.to_string_lossy().to_string(),
            )?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .set_default("instance_extension", defaults.instance_extension)?
            .add_source(File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Location of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Default directory for compile reports.
pub fn default_report_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("reports")
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_loads_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gridrail/config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.instance_extension, "lp");
        assert_eq!(config.report_root, default_report_root());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "report_root = \"/tmp/reports\"\ninstance_extension = \"facts\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.report_root, PathBuf::from("/tmp/reports"));
        assert_eq!(config.instance_extension, "facts");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        Ok(())
    }

    #[test]
    fn missing_file_is_not_an_error() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("absent.toml"))?;
        assert_eq!(config.instance_extension, DEFAULT_EXTENSION);
        Ok(())
    }
}
