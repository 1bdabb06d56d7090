//! # pepcheck
//!
//! Line-oriented style conformance checker for Python source.
//!
//! This is the facade crate: it re-exports the engine from
//! `pepcheck-core`, the rule catalog from `pepcheck-rules`, and adds the
//! two entry points most callers need.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let report = pepcheck::evaluate_source("import os, sys\n", "app.py");
//! for violation in &report.violations {
//!     println!("{violation}");
//! }
//! assert!(!report.is_clean());
//! ```
//!
//! ## Configured Usage
//!
//! ```rust,ignore
//! use pepcheck::Config;
//!
//! let config = Config::parse(r#"
//! [rules.line-length]
//! max_line_length = 99
//! "#)?;
//! let report = pepcheck::evaluate_source_with(text, "app.py", &config)?;
//! ```

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// Re-export core types and traits
pub use pepcheck_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use pepcheck_rules::*;
}

/// Errors from evaluating a file on disk.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not decodable text.
    #[error("{path}: {source}")]
    Encoding {
        /// Path of the undecodable file.
        path: PathBuf,
        /// Decoding failure.
        source: EncodingError,
    },

    /// The configuration does not describe a valid rule set.
    #[error(transparent)]
    Configuration(#[from] RuleConfigurationError),
}

fn default_evaluator() -> &'static Evaluator {
    static DEFAULT: OnceLock<Evaluator> = OnceLock::new();
    DEFAULT.get_or_init(|| Evaluator::new(rules::all_rules()))
}

/// Evaluates text against the full catalog with default settings.
///
/// `identifier` is attached to every violation and is used for display
/// only.
#[must_use]
pub fn evaluate_source(text: &str, identifier: &str) -> Report {
    default_evaluator().evaluate_source(text, identifier)
}

/// Evaluates text against the rule set described by `config`.
///
/// # Errors
///
/// Returns [`RuleConfigurationError`] if the configuration names an unknown
/// preset or rule, or gives a rule an invalid option. Nothing is evaluated
/// in that case.
pub fn evaluate_source_with(
    text: &str,
    identifier: &str,
    config: &Config,
) -> Result<Report, RuleConfigurationError> {
    let evaluator = rules::evaluator_for(config)?;
    Ok(evaluator.evaluate_source(text, identifier))
}

/// Reads, decodes and evaluates one file.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the file cannot be
/// read, or its bytes are not decodable.
pub fn evaluate_file(path: &Path, config: &Config) -> Result<Report, Error> {
    let evaluator = rules::evaluator_for(config)?;
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    evaluator
        .evaluate_bytes(&bytes, &path.display().to_string())
        .map_err(|source| Error::Encoding {
            path: path.to_path_buf(),
            source,
        })
}
