//! Configuration Loader
//!
//! Finds `kestrel.toml` and applies environment overrides on top of it.

use crate::project::{validate_threshold, ProjectConfig, ReportingMode};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "kestrel.toml";

/// Overrides `analysis.mode`
pub const ENV_MODE: &str = "KESTREL_MODE";
/// Overrides `lints.max-params`
pub const ENV_MAX_PARAMS: &str = "KESTREL_MAX_PARAMS";
/// Overrides `lints.max-complexity`
pub const ENV_MAX_COMPLEXITY: &str = "KESTREL_MAX_COMPLEXITY";

/// Configuration loader
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. Project config (kestrel.toml)
/// 3. Environment variables (KESTREL_*)
/// 4. CLI flags (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip the KESTREL_* variables
    ignore_env: bool,
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,

    /// Directory holding kestrel.toml, when one was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that reads files only
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find kestrel.toml; without one the
    /// defaults apply.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = find_project_config(start_dir)?;
        let project = self.apply_env_overrides(project)?;
        Ok(Config {
            project,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project = self.apply_env_overrides(project)?;
        Ok(Config {
            project,
            project_root: config_path.parent().map(Path::to_path_buf),
        })
    }

    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if self.ignore_env {
            return Ok(config);
        }

        if let Ok(mode) = env::var(ENV_MODE) {
            config.analysis.mode = mode.parse::<ReportingMode>().map_err(|_| {
                ConfigError::InvalidValue {
                    field: ENV_MODE.to_string(),
                    reason: format!("'{}' is not 'first-error' or 'collect-all'", mode),
                }
            })?;
        }
        if let Some(max) = threshold_from_env(ENV_MAX_PARAMS)? {
            config.lints.max_params = max;
        }
        if let Some(max) = threshold_from_env(ENV_MAX_COMPLEXITY)? {
            config.lints.max_complexity = max;
        }

        Ok(config)
    }
}

fn threshold_from_env(var: &str) -> ConfigResult<Option<usize>> {
    let Ok(raw) = env::var(var) else {
        return Ok(None);
    };
    let value = raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidValue {
        field: var.to_string(),
        reason: format!("'{}' is not a positive integer", raw),
    })?;
    validate_threshold(var, value)?;
    Ok(Some(value))
}

/// Walk up from `start_dir` to the first directory holding kestrel.toml
fn find_project_config(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
    for dir in start_dir.ancestors() {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let project = ProjectConfig::load_from_file(&config_path)?;
            return Ok((Some(dir.to_path_buf()), project));
        }
    }
    Ok((None, ProjectConfig::default()))
}

impl Config {
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn package_name(&self) -> Option<&str> {
        self.project.package_name()
    }

    /// Check if this is a project (has kestrel.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Whether `file` is the configured entry file
    ///
    /// Without an `entry` setting every file counts as an entry file.
    pub fn is_entry_file(&self, file: &Path) -> bool {
        let Some(entry) = &self.project.analysis.entry else {
            return true;
        };
        file.ends_with(entry)
            || self
                .project_root
                .as_ref()
                .is_some_and(|root| root.join(entry) == file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[package]
name = "test-project"
version = "1.0.0"
"#,
        );

        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.package_name(), Some("test-project"));
        assert!(config.is_project());
    }

    #[test]
    fn test_no_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.package_name(), None);
        assert!(!config.is_project());
        assert_eq!(config.project.analysis.mode, ReportingMode::FirstError);
    }

    #[test]
    #[serial]
    fn test_env_override_mode() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[analysis]
mode = "first-error"
"#,
        );

        env::set_var(ENV_MODE, "collect-all");
        let config = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var(ENV_MODE);

        assert_eq!(
            config.unwrap().project.analysis.mode,
            ReportingMode::CollectAll
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_threshold() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(ENV_MAX_PARAMS, "many");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var(ENV_MAX_PARAMS);

        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, ENV_MAX_PARAMS),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_file_matching() {
        let mut config = Config {
            project: ProjectConfig::default(),
            project_root: Some(PathBuf::from("/work/app")),
        };
        assert!(config.is_entry_file(Path::new("anything.kes")));

        config.project.analysis.entry = Some(PathBuf::from("src/main.kes"));
        assert!(config.is_entry_file(Path::new("/work/app/src/main.kes")));
        assert!(config.is_entry_file(Path::new("src/main.kes")));
        assert!(!config.is_entry_file(Path::new("/work/app/src/util.kes")));
    }
}
