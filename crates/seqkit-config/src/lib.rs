//! seqkit Configuration System
//!
//! Provides configuration for the seqkit runtime:
//! - Textual callback policy (enable switch, sandbox limits)
//! - Compatibility policies (`flat` falsy dropping, `copy_within` overlap)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.seqkit/config.toml)
//! 2. Project config (./seqkit.toml, searched upwards)
//! 3. Environment variables (SEQKIT_*)
//!
//! # Example
//!
//! ```no_run
//! use seqkit_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("text callbacks enabled: {}", config.settings.text_callbacks_enabled());
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use settings::{
    CallbacksConfig, CopyWithinConfig, FlatConfig, OverlapMode, SeqkitConfig,
    DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_EXPRESSION_LENGTH,
};
