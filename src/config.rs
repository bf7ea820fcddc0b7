//! Content-lake connection settings.
//!
//! Resolved in priority order:
//! 1. CLI flags
//! 2. `SANITY_*` environment variables
//! 3. JSON config file (`--config`, `SCPB_MIGRATE_CONFIG`, or the per-user
//!    config dir)
//! 4. Built-in studio defaults
//!
//! The API token is read only from `SANITY_AUTH_TOKEN` so it never lands in a
//! checked-in file.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROJECT_ID: &str = "0b1e7ens";
pub const DEFAULT_DATASET: &str = "production";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Studio workspace identity, as registered with the hosted editor.
pub const STUDIO_NAME: &str = "default";
pub const STUDIO_TITLE: &str = "scpb";
/// Editor plugins enabled for the workspace.
pub const STUDIO_PLUGINS: &[&str] = &["structureTool", "visionTool"];

pub const CONFIG_ENV: &str = "SCPB_MIGRATE_CONFIG";
pub const TOKEN_ENV: &str = "SANITY_AUTH_TOKEN";
const PROJECT_ENV: &str = "SANITY_PROJECT_ID";
const DATASET_ENV: &str = "SANITY_DATASET";
const API_VERSION_ENV: &str = "SANITY_API_VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// On-disk config file shape.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

/// Values given on the command line; `None` means "not set".
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub api_version: Option<String>,
}

impl StudioConfig {
    /// Resolve against the process environment.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::resolve(overrides, &env, default_config_path())
    }

    /// Resolve against an explicit environment; `fallback_path` is only read
    /// if it exists.
    pub fn resolve(
        overrides: &ConfigOverrides,
        env: &HashMap<String, String>,
        fallback_path: Option<PathBuf>,
    ) -> Result<Self> {
        let file = match overrides
            .config_path
            .clone()
            .or_else(|| env.get(CONFIG_ENV).map(PathBuf::from))
        {
            Some(path) => read_config_file(&path)?,
            None => match fallback_path.filter(|path| path.is_file()) {
                Some(path) => read_config_file(&path)?,
                None => ConfigFile::default(),
            },
        };

        let defaults = StudioConfig::default();
        let pick = |flag: &Option<String>, key: &str, from_file: Option<String>, default: String| {
            flag.clone()
                .or_else(|| env.get(key).cloned())
                .or(from_file)
                .unwrap_or(default)
        };

        let config = StudioConfig {
            project_id: pick(
                &overrides.project_id,
                PROJECT_ENV,
                file.project_id,
                defaults.project_id,
            ),
            dataset: pick(&overrides.dataset, DATASET_ENV, file.dataset, defaults.dataset),
            api_version: pick(
                &overrides.api_version,
                API_VERSION_ENV,
                file.api_version,
                defaults.api_version,
            ),
            token: env.get(TOKEN_ENV).filter(|t| !t.trim().is_empty()).cloned(),
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let is_slug = |value: &str| {
            !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !is_slug(&self.project_id) {
            return Err(anyhow!("invalid project id: {:?}", self.project_id));
        }
        if !is_slug(&self.dataset) {
            return Err(anyhow!("invalid dataset name: {:?}", self.dataset));
        }
        if !is_slug(&self.api_version) {
            return Err(anyhow!("invalid API version: {:?}", self.api_version));
        }
        if self.timeout.is_zero() {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let text = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scpb-migrate").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_studio_project() {
        let config = StudioConfig::resolve(&ConfigOverrides::default(), &env(&[]), None).unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.project_id, "0b1e7ens");
        assert_eq!(config.dataset, "production");
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"project_id": "fromfile", "dataset": "fromfile", "api_version": "2023-05-03", "timeout_secs": 5}"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            config_path: Some(path),
            dataset: Some("staging".to_string()),
            ..ConfigOverrides::default()
        };
        let config = StudioConfig::resolve(
            &overrides,
            &env(&[("SANITY_DATASET", "envset"), ("SANITY_PROJECT_ID", "envproj")]),
            None,
        )
        .unwrap();

        assert_eq!(config.dataset, "staging");
        assert_eq!(config.project_id, "envproj");
        assert_eq!(config.api_version, "2023-05-03");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn token_comes_from_env_only() {
        let config = StudioConfig::resolve(
            &ConfigOverrides::default(),
            &env(&[("SANITY_AUTH_TOKEN", "sk-test")]),
            None,
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("sk-test"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"token": "leaked"}"#).unwrap();
        let overrides = ConfigOverrides {
            config_path: Some(path),
            ..ConfigOverrides::default()
        };
        let err = StudioConfig::resolve(&overrides, &env(&[]), None).unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"), "{err:#}");
    }

    #[test]
    fn fallback_path_is_optional() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        let config =
            StudioConfig::resolve(&ConfigOverrides::default(), &env(&[]), Some(missing)).unwrap();
        assert_eq!(config.dataset, DEFAULT_DATASET);
    }

    #[test]
    fn rejects_unsafe_dataset_names() {
        let overrides = ConfigOverrides {
            dataset: Some("prod/../x".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(StudioConfig::resolve(&overrides, &env(&[]), None).is_err());
    }
}
