//! Configuration management for Jiraflow.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable naming an alternate directory for workflow caches.
pub const CACHE_DIR_ENV: &str = "JIRAFLOW_WORKFLOW_DIR";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Jira connection settings
    pub jira: JiraConfig,

    /// Workflow engine settings
    pub workflow: WorkflowConfig,
}

/// Jira connection settings.
///
/// The API token is never read from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Site URL, used when JIRA_BASE_URL is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Account email, used when JIRA_EMAIL is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Default project key, used to scope the workflow cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Workflow engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Pause after each transition before verifying, in milliseconds
    pub step_delay_ms: u64,

    /// Number of cached destinations to suggest
    pub suggestion_limit: usize,

    /// Directory holding workflow cache files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Whether to guess destinations from transition names when Jira does not report them
    pub heuristics: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { step_delay_ms: 1000, suggestion_limit: 5, cache_dir: None, heuristics: true }
    }
}

impl WorkflowConfig {
    /// Pause after each transition.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.jiraflow.toml` in current directory
    /// 2. `~/.config/jiraflow/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".jiraflow.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(global_config) = Self::global_config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("jiraflow"))
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Directory for workflow cache files, honoring the environment override.
    pub fn cache_dir(&self) -> anyhow::Result<PathBuf> {
        self.cache_dir_with(std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from))
    }

    /// Directory for workflow cache files given an explicit override.
    ///
    /// Order: override, then `workflow.cache_dir`, then the config directory.
    pub fn cache_dir_with(&self, env_override: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        if let Some(dir) = env_override.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(dir);
        }

        if let Some(ref dir) = self.workflow.cache_dir {
            return Ok(dir.clone());
        }

        Self::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.jira.base_url.is_none());
        assert_eq!(config.workflow.step_delay_ms, 1000);
        assert_eq!(config.workflow.suggestion_limit, 5);
        assert!(config.workflow.heuristics);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[workflow]"));
        assert!(toml_str.contains("step_delay_ms = 1000"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [jira]
            base_url = "https://example.atlassian.net"
            project = "ENG"

            [workflow]
            step_delay_ms = 250
            heuristics = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.jira.base_url.as_deref(), Some("https://example.atlassian.net"));
        assert_eq!(config.jira.project.as_deref(), Some("ENG"));
        assert!(config.jira.email.is_none());
        assert_eq!(config.workflow.step_delay(), Duration::from_millis(250));
        assert!(!config.workflow.heuristics);
        assert_eq!(config.workflow.suggestion_limit, 5);
    }

    #[test]
    fn test_cache_dir_precedence() {
        let mut config = Config::default();
        config.workflow.cache_dir = Some(PathBuf::from("/from/config"));

        let dir = config.cache_dir_with(Some(PathBuf::from("/from/env"))).unwrap();
        assert_eq!(dir, PathBuf::from("/from/env"));

        let dir = config.cache_dir_with(None).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));

        let dir = config.cache_dir_with(Some(PathBuf::new())).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    #[serial(jiraflow_cache_env)]
    fn test_cache_dir_reads_env() {
        let original = std::env::var_os(CACHE_DIR_ENV);
        std::env::set_var(CACHE_DIR_ENV, "/tmp/jiraflow-test");

        let dir = Config::default().cache_dir().unwrap();

        match original {
            Some(val) => std::env::set_var(CACHE_DIR_ENV, val),
            None => std::env::remove_var(CACHE_DIR_ENV),
        }

        assert_eq!(dir, PathBuf::from("/tmp/jiraflow-test"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[workflow]\nsuggestion_limit = 3\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.workflow.suggestion_limit, 3);
    }

    #[test]
    fn test_load_from_invalid_file_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[jira\nproject = \"ENG\"\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(err.to_string().contains("config.toml"));
    }
}
