//! # pepcheck-core
//!
//! Core engine for line-and-token style checking.
//!
//! Data flows one way through this crate:
//!
//! - [`scan`] turns raw text into a [`SourceFile`] of annotated lines and tokens
//! - [`Evaluator`] runs a set of [`Rule`]s over it in a single forward pass,
//!   keeping cross-line memory in an [`EvaluationState`]
//! - [`aggregate`] sorts and deduplicates the violations into a [`Report`]
//!
//! ## Example
//!
//! ```ignore
//! use pepcheck_core::Evaluator;
//!
//! let evaluator = Evaluator::builder()
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let report = evaluator.evaluate_source("x = 1\n", "example.py");
//! assert!(report.is_clean());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod context;
mod evaluator;
mod report;
mod rule;
mod scanner;
mod types;

/// Import statement recognition and grouping.
pub mod imports;
/// Scanned source representation.
pub mod source;
/// Cross-line evaluation state.
pub mod state;
/// Shallow statement recognizers.
pub mod syntax;
/// Utility modules for rule implementations.
pub mod utils;

pub use batch::{CancellationFlag, SourceInput};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig, RuleConfigurationError};
pub use context::LineContext;
pub use evaluator::{Evaluator, EvaluatorBuilder, MALFORMED_INPUT, MALFORMED_INPUT_CODE};
pub use report::{aggregate, Report};
pub use rule::{Rule, RuleBox};
pub use scanner::{scan, scan_str, EncodingError, EncodingHint};
pub use source::{Line, LineKind, SourceFile, Token, TokenKind};
pub use state::EvaluationState;
pub use types::{
    Category, FileFailure, LintResult, Location, Severity, Suggestion, Violation,
    ViolationDiagnostic,
};
pub use utils::allowance::AllowCheck;
