//! Demo configuration
//!
//! Configuration loaded from `.redux-demo.toml`.

use anyhow::{Context, Result};
use redux_store::ListenerErrorPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Demo configuration loaded from .redux-demo.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DemoConfig {
    /// What the store does when a listener fails ("log-and-continue" or "collect")
    #[serde(default)]
    pub listener_error_policy: ListenerErrorPolicy,

    /// Install the logging middleware on demo stores
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,

    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Also write logs to a timestamped file in the cache directory
    #[serde(default)]
    pub log_to_file: bool,
}

fn default_log_actions() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            listener_error_policy: ListenerErrorPolicy::default(),
            log_actions: default_log_actions(),
            log_level: default_log_level(),
            log_to_file: false,
        }
    }
}

impl DemoConfig {
    /// Load config from CWD first, then the config directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded demo config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default demo config");
        Self::default()
    }

    /// Load config from an explicit path; a missing or malformed file is an error
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DemoConfig::default();
        assert_eq!(
            config.listener_error_policy,
            ListenerErrorPolicy::LogAndContinue
        );
        assert!(config.log_actions);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_to_file);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            listener_error_policy = "collect"
            log_level = "debug"
        "#;
        let config: DemoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.listener_error_policy, ListenerErrorPolicy::Collect);
        assert_eq!(config.log_level, "debug");
        // log_actions should use default
        assert!(config.log_actions);
    }

    #[test]
    fn test_config_rejects_unknown_policy() {
        let toml = r#"listener_error_policy = "ignore""#;
        assert!(toml::from_str::<DemoConfig>(toml).is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".redux-demo.toml");
        std::fs::write(&path, "log_actions = false\nlog_to_file = true\n").unwrap();

        let config = DemoConfig::load_from_path(&path).unwrap();

        assert!(!config.log_actions);
        assert!(config.log_to_file);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = DemoConfig::load_from_path(Path::new("/nonexistent/redux-demo.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
