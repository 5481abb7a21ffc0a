//! Project Configuration (kestrel.toml)
//!
//! Handles project-level configuration stored in `kestrel.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Project configuration from kestrel.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageConfig>,

    /// How files are analysed
    #[serde(default)]
    pub analysis: AnalysisSection,

    /// Lint switches and thresholds
    #[serde(default)]
    pub lints: LintSection,
}

/// Package metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Package version (semver)
    pub version: String,
}

/// Whether analysis stops at the first error
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReportingMode {
    /// Single-file checking
    #[default]
    FirstError,
    /// Project checking
    CollectAll,
}

impl FromStr for ReportingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-error" => Ok(ReportingMode::FirstError),
            "collect-all" => Ok(ReportingMode::CollectAll),
            other => Err(ConfigError::InvalidValue {
                field: "analysis.mode".to_string(),
                reason: format!(
                    "unknown mode '{}' (expected 'first-error' or 'collect-all')",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for ReportingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportingMode::FirstError => write!(f, "first-error"),
            ReportingMode::CollectAll => write!(f, "collect-all"),
        }
    }
}

/// `[analysis]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AnalysisSection {
    #[serde(default)]
    pub mode: ReportingMode,

    /// Entry file; module-level lints only fire there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Make the host intrinsics visible
    #[serde(default)]
    pub compiler_build: bool,
}

/// `[lints]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LintSection {
    #[serde(default = "default_true")]
    pub unused_bindings: bool,

    #[serde(default = "default_max_params")]
    pub max_params: usize,

    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            unused_bindings: true,
            max_params: default_max_params(),
            max_complexity: default_max_complexity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_params() -> usize {
    7
}

fn default_max_complexity() -> usize {
    15
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(pkg) = &self.package {
            if pkg.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "package.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
            if !is_valid_version(&pkg.version) {
                return Err(ConfigError::InvalidVersion(pkg.version.clone()));
            }
        }

        validate_threshold("lints.max-params", self.lints.max_params)?;
        validate_threshold("lints.max-complexity", self.lints.max_complexity)?;
        Ok(())
    }

    /// Get the package name, if present
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// Get the package version, if present
    pub fn package_version(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.version.as_str())
    }
}

/// Lint thresholds must be positive
pub(crate) fn validate_threshold(field: &str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Basic semver validation (simplified)
fn is_valid_version(version: &str) -> bool {
    // Split on '-' or '+' to separate version from pre-release/build
    let main_version = version.split(['-', '+']).next().unwrap_or("");
    if main_version.is_empty() {
        return false;
    }

    // X.Y or X.Y.Z where X, Y, Z are digits
    let parts: Vec<&str> = main_version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }
    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
