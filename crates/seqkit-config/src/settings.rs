//! Settings file schema (seqkit.toml and ~/.seqkit/config.toml)
//!
//! Both the global and the project file share one schema. Every field is
//! optional so that a later source only overrides what it names.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on textual callback source length, in bytes
pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 4096;

/// Default cap on textual callback nesting depth
pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 64;

/// Settings loaded from a seqkit TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SeqkitConfig {
    /// Textual callback policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<CallbacksConfig>,

    /// `flat` compatibility policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<FlatConfig>,

    /// `copy_within` compatibility policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_within: Option<CopyWithinConfig>,
}

/// Textual callback policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CallbacksConfig {
    /// Accept textual callbacks at all (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,

    /// Maximum expression source length in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Maximum expression nesting depth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// `flat` policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FlatConfig {
    /// Drop every falsy value at exhausted depth, not just nil (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_falsy: Option<bool>,
}

/// `copy_within` policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CopyWithinConfig {
    /// "forward" or "memmove"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<String>,
}

/// How `copy_within` treats overlapping source and target ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMode {
    /// Slot-by-slot forward copy; an overlapping source may be overwritten before it is read
    #[default]
    Forward,
    /// Source range is read in full before any write lands
    Memmove,
}

impl OverlapMode {
    /// Parse a configuration string
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "forward" => Some(OverlapMode::Forward),
            "memmove" => Some(OverlapMode::Memmove),
            _ => None,
        }
    }
}

impl SeqkitConfig {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { error, .. } => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "loaded seqkit settings");
        Ok(config)
    }

    /// Parse and validate settings from TOML text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: Default::default(),
            error: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(callbacks) = &self.callbacks {
            if callbacks.max_length == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "callbacks.max_length".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if callbacks.max_depth == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "callbacks.max_depth".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if let Some(overlap) = self.copy_within.as_ref().and_then(|c| c.overlap.as_ref()) {
            if OverlapMode::parse(overlap).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "copy_within.overlap".to_string(),
                    reason: format!("must be 'forward' or 'memmove', got '{}'", overlap),
                });
            }
        }

        Ok(())
    }

    /// Merge another config into this one, field by field.
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &SeqkitConfig) {
        if let Some(theirs) = &other.callbacks {
            let ours = self.callbacks.get_or_insert_with(Default::default);
            if theirs.text.is_some() {
                ours.text = theirs.text;
            }
            if theirs.max_length.is_some() {
                ours.max_length = theirs.max_length;
            }
            if theirs.max_depth.is_some() {
                ours.max_depth = theirs.max_depth;
            }
        }
        if let Some(theirs) = &other.flat {
            if theirs.drop_falsy.is_some() {
                self.flat.get_or_insert_with(Default::default).drop_falsy = theirs.drop_falsy;
            }
        }
        if let Some(theirs) = &other.copy_within {
            if theirs.overlap.is_some() {
                self.copy_within
                    .get_or_insert_with(Default::default)
                    .overlap = theirs.overlap.clone();
            }
        }
    }

    /// Whether textual callbacks are accepted
    pub fn text_callbacks_enabled(&self) -> bool {
        self.callbacks
            .as_ref()
            .and_then(|c| c.text)
            .unwrap_or(true)
    }

    /// Effective expression length cap
    pub fn max_expression_length(&self) -> usize {
        self.callbacks
            .as_ref()
            .and_then(|c| c.max_length)
            .unwrap_or(DEFAULT_MAX_EXPRESSION_LENGTH)
    }

    /// Effective expression depth cap
    pub fn max_expression_depth(&self) -> usize {
        self.callbacks
            .as_ref()
            .and_then(|c| c.max_depth)
            .unwrap_or(DEFAULT_MAX_EXPRESSION_DEPTH)
    }

    /// Whether `flat` drops every falsy value (compat) or only nil
    pub fn flat_drops_falsy(&self) -> bool {
        self.flat.as_ref().and_then(|f| f.drop_falsy).unwrap_or(true)
    }

    /// Effective `copy_within` overlap mode
    pub fn overlap_mode(&self) -> OverlapMode {
        self.copy_within
            .as_ref()
            .and_then(|c| c.overlap.as_deref())
            .and_then(OverlapMode::parse)
            .unwrap_or_default()
    }
}
