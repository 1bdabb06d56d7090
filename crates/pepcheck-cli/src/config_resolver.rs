//! Configuration file resolution with global fallback.
//!
//! Resolution order:
//!
//! 1. `--config` flag (or `$PEPCHECK_CONFIG`)
//! 2. `{project}/pepcheck.toml` or `.pepcheck.toml`
//! 3. `~/.pepcheck/config.toml`, or `$PEPCHECK_CONFIG_DIR/config.toml`
//! 4. Built-in defaults

use anyhow::{Context, Result};
use pepcheck_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if let Self::Global(_) = self {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: [&str; 2] = ["pepcheck.toml", ".pepcheck.toml"];

/// Config file name inside the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "PEPCHECK_CONFIG_DIR";

/// Resolves the configuration for a project directory.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir().as_deref())
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

/// Returns the global config directory: `$PEPCHECK_CONFIG_DIR`, else
/// `~/.pepcheck`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".pepcheck")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins_and_is_not_checked() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("pepcheck.toml"), "").unwrap();

        let explicit = Path::new("/nonexistent/pepcheck.toml");
        assert_eq!(
            resolve_in(project.path(), Some(explicit), None),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn project_files_in_priority_order() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".pepcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join(".pepcheck.toml"))
        );

        fs::write(project.path().join("pepcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join("pepcheck.toml"))
        );
    }

    #[test]
    fn global_config_is_the_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            resolve_in(project.path(), None, Some(global.path())),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, Some(global.path())),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("pepcheck.toml"), "").unwrap();
        assert!(matches!(
            resolve_in(project.path(), None, Some(global.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_reads_toml_and_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pepcheck.toml");
        fs::write(&path, "preset = \"layout\"\n").unwrap();

        let config = ConfigSource::Project(path).load().unwrap();
        assert_eq!(config.preset.as_deref(), Some("layout"));
        assert!(ConfigSource::Default.load().unwrap().preset.is_none());
    }

    #[test]
    fn load_reports_the_failing_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pepcheck.toml");
        fs::write(&path, "preset = [").unwrap();

        let err = ConfigSource::Explicit(path.clone()).load().unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
