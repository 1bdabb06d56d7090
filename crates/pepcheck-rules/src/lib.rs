//! # pepcheck-rules
//!
//! The built-in style rule catalog for pepcheck.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PS101 | `indent-width` | Indentation is a multiple of 4 spaces, never tabs |
//! | PS201 | `line-length` | Code lines ≤79 characters, comments and docstrings ≤72 |
//! | PS301 | `blank-lines-top` | Two blank lines before top-level definitions |
//! | PS302 | `blank-lines-method` | One blank line between methods |
//! | PS303 | `no-multi-blank` | No runs of 3+ blank lines |
//! | PS401 | `import-one-per-line` | One module per `import` statement |
//! | PS402 | `import-group-order` | Standard library, third party, local; one blank line apart |
//! | PS501 | `naming-function` | Functions and variables use `lower_case_with_underscores` |
//! | PS502 | `naming-class` | Classes use `CapWords` |
//! | PS503 | `naming-constant` | Module constants use `ALL_CAPS` and are never reassigned |
//! | PS601 | `whitespace-brackets` | No space inside brackets |
//! | PS602 | `whitespace-punct` | One space after `,` `:` `;`, none before |
//! | PS603 | `whitespace-call` | No space before a call's `(` |
//! | PS701 | `comment-format` | Comments start with `# `; inline comments two spaces from code |
//! | PS801 | `docstring-quotes` | Docstrings use `"""` |
//! | PS403 | `no-wildcard-import` | No `from module import *` |
//! | PS901 | `no-bool-literal-compare` | No `== True` / `== False` |
//! | PS902 | `use-is-for-none` | `is None`, not `== None` |
//! | PS903 | `no-backslash-continuation` | Continue lines inside brackets |
//!
//! The table is in catalog order, which breaks ties between violations at
//! the same position.
//!
//! ## Usage
//!
//! ```ignore
//! use pepcheck_core::Config;
//! use pepcheck_rules::evaluator_for;
//!
//! let evaluator = evaluator_for(&Config::default())?;
//! let report = evaluator.evaluate_source("import os, sys\n", "app.py");
//! assert_eq!(report.total, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blank_lines;
mod comments;
mod docstrings;
mod idioms;
mod imports;
mod indentation;
mod line_length;
mod naming;
mod presets;
mod whitespace;

pub use blank_lines::{BlankLinesMethod, BlankLinesTop, NoMultiBlank};
pub use comments::CommentFormat;
pub use docstrings::DocstringQuotes;
pub use idioms::{NoBackslashContinuation, NoBoolLiteralCompare, UseIsForNone};
pub use imports::{ImportGroupOrder, ImportOnePerLine, NoWildcardImport};
pub use indentation::IndentWidth;
pub use line_length::LineLength;
pub use naming::{NamingClass, NamingConstant, NamingFunction};
pub use presets::{
    all_rules, configured_rules, evaluator_builder, evaluator_for, layout_rules, rule_ids, Preset,
};
pub use whitespace::{WhitespaceBrackets, WhitespaceCall, WhitespacePunct};

/// Re-export core types for convenience.
pub use pepcheck_core::{Rule, Severity, Violation};

#[cfg(test)]
pub(crate) mod test_support {
    use pepcheck_core::{Config, Evaluator, Rule, Violation, MALFORMED_INPUT};

    fn evaluator<R: Rule + 'static>(rule: R, local: &[&str]) -> Evaluator {
        let mut config = Config::default();
        config.set_enabled(MALFORMED_INPUT, false);
        Evaluator::builder()
            .rule(rule)
            .config(config)
            .local_packages(local.iter().copied())
            .build()
            .unwrap()
    }

    /// Runs a single rule over `src`.
    pub fn check<R: Rule + 'static>(rule: R, src: &str) -> Vec<Violation> {
        check_with_local(rule, src, &[])
    }

    /// Runs a single rule over `src` with the given local packages.
    pub fn check_with_local<R: Rule + 'static>(
        rule: R,
        src: &str,
        local: &[&str],
    ) -> Vec<Violation> {
        evaluator(rule, local)
            .evaluate_source(src, "test.py")
            .violations
    }
}
