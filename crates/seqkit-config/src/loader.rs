//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{CallbacksConfig, CopyWithinConfig, FlatConfig, SeqkitConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project settings file name
pub const PROJECT_CONFIG_FILE: &str = "seqkit.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.seqkit/config.toml) - lowest priority
/// 2. Project config (./seqkit.toml) - overrides global
/// 3. Environment variables (SEQKIT_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Effective settings after merging every source
    pub settings: SeqkitConfig,

    /// Project root directory (where seqkit.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config path instead of ~/.seqkit/config.toml
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find seqkit.toml, layers it over the
    /// global config if one exists, then applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut settings = self.global_or_default();

        let (project_root, project_settings) = self.find_project_config(start_dir)?;
        settings.merge(&project_settings);

        apply_env_overrides(&mut settings)?;
        settings.validate()?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let mut settings = self.global_or_default();
        settings.merge(&SeqkitConfig::load_from_file(config_path)?);

        apply_env_overrides(&mut settings)?;
        settings.validate()?;

        Ok(Config {
            settings,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, SeqkitConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let settings = SeqkitConfig::load_from_file(&config_path)?;
                return Ok((Some(current), settings));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => {
                    tracing::debug!(start = %start_dir.display(), "no seqkit.toml found");
                    return Ok((None, SeqkitConfig::default()));
                }
            }
        }
    }

    /// Load global configuration from ~/.seqkit/config.toml
    /// Global settings, or defaults when the global file cannot be used
    fn global_or_default(&mut self) -> SeqkitConfig {
        self.load_global_config().unwrap_or_else(|error| {
            tracing::warn!(%error, "ignoring unusable global config, using defaults");
            SeqkitConfig::default()
        })
    }

    fn load_global_config(&mut self) -> ConfigResult<SeqkitConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = Self::global_config_dir()?.join("config.toml");
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional
        if !path.exists() {
            return Ok(SeqkitConfig::default());
        }

        SeqkitConfig::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.seqkit)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".seqkit"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a seqkit.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

/// Apply SEQKIT_* environment variables on top of file settings
fn apply_env_overrides(settings: &mut SeqkitConfig) -> ConfigResult<()> {
    if let Ok(text) = env::var("SEQKIT_TEXT_CALLBACKS") {
        tracing::debug!(value = %text, "SEQKIT_TEXT_CALLBACKS override");
        callbacks_mut(settings).text = Some(parse_bool(&text));
    }

    if let Ok(length) = env::var("SEQKIT_MAX_EXPRESSION_LENGTH") {
        callbacks_mut(settings).max_length =
            Some(parse_usize("SEQKIT_MAX_EXPRESSION_LENGTH", &length)?);
    }

    if let Ok(depth) = env::var("SEQKIT_MAX_EXPRESSION_DEPTH") {
        callbacks_mut(settings).max_depth =
            Some(parse_usize("SEQKIT_MAX_EXPRESSION_DEPTH", &depth)?);
    }

    if let Ok(drop_falsy) = env::var("SEQKIT_FLAT_DROP_FALSY") {
        settings
            .flat
            .get_or_insert_with(FlatConfig::default)
            .drop_falsy = Some(parse_bool(&drop_falsy));
    }

    if let Ok(overlap) = env::var("SEQKIT_COPY_WITHIN") {
        settings
            .copy_within
            .get_or_insert_with(CopyWithinConfig::default)
            .overlap = Some(overlap.to_lowercase());
    }

    Ok(())
}

fn callbacks_mut(settings: &mut SeqkitConfig) -> &mut CallbacksConfig {
    settings.callbacks.get_or_insert_with(CallbacksConfig::default)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_usize(field: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("expected a positive integer, got '{}'", value),
    })
}
