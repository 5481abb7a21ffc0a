//! Kestrel Configuration
//!
//! Loads the project configuration (`kestrel.toml`) used by the `kestrel`
//! command line:
//! - `[package]` metadata
//! - `[analysis]` reporting mode, entry file and build flavour
//! - `[lints]` switches and thresholds
//!
//! # Precedence
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. Project config (`kestrel.toml`, found by walking up from a directory)
//! 3. Environment variables (`KESTREL_*`)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use kestrel_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{:?}", config.project.analysis.mode);
//! ```

pub mod loader;
pub mod project;

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

    #[error("Invalid semver version: {0}")]
    InvalidVersion(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME};
pub use project::{AnalysisSection, LintSection, PackageConfig, ProjectConfig, ReportingMode};
