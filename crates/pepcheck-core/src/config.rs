//! Configuration types for pepcheck.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Severity;

/// Rule id of the import grouping rule, which owns the `local_packages` option.
const IMPORT_GROUP_ORDER: &str = "import-group-order";

/// Top-level configuration for pepcheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (`"pep8"` or `"layout"`).
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule id.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Enables or disables a rule.
    pub fn set_enabled(&mut self, rule_name: &str, enabled: bool) {
        self.rules.entry(rule_name.to_string()).or_default().enabled = Some(enabled);
    }

    /// Overrides the severity of a rule.
    pub fn set_severity(&mut self, rule_name: &str, severity: Severity) {
        self.rules.entry(rule_name.to_string()).or_default().severity = Some(severity);
    }

    /// Severity at or above which a report fails the run.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Top-level packages configured as local for import grouping.
    #[must_use]
    pub fn local_packages(&self) -> Vec<String> {
        self.rules
            .get(IMPORT_GROUP_ORDER)
            .map(|c| c.get_str_array("local_packages"))
            .unwrap_or_default()
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, all `*.py` files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of files evaluated in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            include: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_exclude() -> Vec<String> {
    ["**/.venv/**", "**/venv/**", "**/__pycache__/**", "**/.tox/**"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads a strictly positive integer option.
    ///
    /// # Errors
    ///
    /// Returns [`RuleConfigurationError::InvalidOption`] if the option is
    /// present but is not a positive integer.
    pub fn positive_int(
        &self,
        rule: &str,
        key: &str,
    ) -> Result<Option<usize>, RuleConfigurationError> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        value
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0)
            .map(Some)
            .ok_or_else(|| RuleConfigurationError::InvalidOption {
                rule: rule.to_string(),
                option: key.to_string(),
                message: format!("expected a positive integer, found `{value}`"),
            })
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

/// Errors raised while turning configuration into a rule set.
///
/// These surface before any source is evaluated, so a misconfigured run
/// never silently checks the wrong rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleConfigurationError {
    /// Configuration references a rule id that is not in the catalog.
    #[error("unknown rule `{id}`")]
    UnknownRule {
        /// The unrecognised id.
        id: String,
    },

    /// A rule option has an invalid value.
    #[error("invalid option `{option}` for rule `{rule}`: {message}")]
    InvalidOption {
        /// Rule id.
        rule: String,
        /// Option key.
        option: String,
        /// What is wrong with it.
        message: String,
    },

    /// Configuration names a preset that does not exist.
    #[error("unknown preset `{name}`. Valid presets: {valid}")]
    UnknownPreset {
        /// The unrecognised preset name.
        name: String,
        /// Comma-separated list of valid presets.
        valid: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_threshold(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "layout"
fail_on = "warning"

[analyzer]
exclude = ["**/generated/**"]
parallelism = 2

[rules.line-length]
severity = "warning"
max_line_length = 99

[rules.naming-constant]
enabled = false

[rules.import-group-order]
local_packages = ["myapp", "tests"]
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.preset.as_deref(), Some("layout"));
        assert_eq!(config.fail_threshold(), Severity::Warning);
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert!(config.is_rule_enabled("line-length"));
        assert!(!config.is_rule_enabled("naming-constant"));
        assert_eq!(config.rule_severity("line-length"), Some(Severity::Warning));
        assert_eq!(config.local_packages(), vec!["myapp", "tests"]);

        let rule_config = config.rules.get("line-length").unwrap();
        assert_eq!(rule_config.positive_int("line-length", "max_line_length"), Ok(Some(99)));
    }

    #[test]
    fn rejects_non_positive_option() {
        let config = Config::parse("[rules.line-length]\nmax_line_length = 0\n").unwrap();
        let err = config.rules["line-length"]
            .positive_int("line-length", "max_line_length")
            .unwrap_err();
        assert!(matches!(err, RuleConfigurationError::InvalidOption { .. }));
    }

    #[test]
    fn rejects_invalid_severity() {
        assert!(Config::parse("[rules.line-length]\nseverity = \"fatal\"\n").is_err());
    }

    #[test]
    fn setters_create_rule_entries() {
        let mut config = Config::new();
        config.set_enabled("use-is-for-none", false);
        config.set_severity("line-length", Severity::Warning);
        assert!(!config.is_rule_enabled("use-is-for-none"));
        assert_eq!(config.rule_severity("line-length"), Some(Severity::Warning));
    }
}
