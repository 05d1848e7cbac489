//! Session configuration.

use anyhow::{Context, Result};
use enigmata_rename::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Entity names that are never renamed, whatever the configuration says.
pub const BUILTIN_ENTITY_EXCLUSIONS: [&str; 3] = ["player.base", "format_version", "version"];

/// UI names that are never renamed.
pub const BUILTIN_UI_EXCLUSIONS: [&str; 1] = ["namespace"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must contain at least one non-empty character pool")]
    EmptyPool { field: &'static str },

    #[error("invalid built-in pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Namespace of the pack's own UI files
    pub namespace: String,
    pub generator: GeneratorConfig,
    pub excluded_entity_names: HashSet<String>,
    /// Compared against the part of a UI key or value before `@`
    pub excluded_ui_names: HashSet<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            generator: GeneratorConfig::default(),
            excluded_entity_names: BUILTIN_ENTITY_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            excluded_ui_names: BUILTIN_UI_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig =
            serde_json::from_str(json).context("failed to parse session config")?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Add the built-in exclusions back after a user-supplied set replaced them.
    pub fn normalized(mut self) -> Self {
        self.excluded_entity_names
            .extend(BUILTIN_ENTITY_EXCLUSIONS.iter().map(|s| s.to_string()));
        self.excluded_ui_names
            .extend(BUILTIN_UI_EXCLUSIONS.iter().map(|s| s.to_string()));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let usable = |pools: &[String]| pools.iter().any(|p| !p.is_empty());
        if !usable(&self.generator.glyph_pools) {
            return Err(ConfigError::EmptyPool {
                field: "generator.glyph_pools",
            });
        }
        if !usable(&self.generator.ascii_pools) {
            return Err(ConfigError::EmptyPool {
                field: "generator.ascii_pools",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_and_builtins() {
        let config = SessionConfig::from_json_str(
            r#"{"namespace": "mine", "excluded_entity_names": ["steve"]}"#,
        )
        .unwrap();
        assert_eq!(config.namespace, "mine");
        assert!(config.excluded_entity_names.contains("steve"));
        assert!(config.excluded_entity_names.contains("format_version"));
        assert!(config.excluded_ui_names.contains("namespace"));
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn empty_pools_are_rejected() {
        let err = SessionConfig::from_json_str(r#"{"generator": {"ascii_pools": [""]}}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("generator.ascii_pools"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enigmata.json");
        std::fs::write(&path, r#"{"namespace": "pack"}"#).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap().namespace, "pack");

        let missing = dir.path().join("missing.json");
        assert!(SessionConfig::load(&missing).is_err());
    }
}
