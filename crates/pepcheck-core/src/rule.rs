//! Rule trait for defining style rules.

use crate::context::LineContext;
use crate::types::{Category, Severity, Violation};

/// A line-oriented style rule.
///
/// Rules are stateless: everything they need to remember across lines is
/// kept by the evaluator in [`crate::EvaluationState`] and handed to
/// [`Rule::check`] through the [`LineContext`].
///
/// # Example
///
/// ```ignore
/// use pepcheck_core::{Category, LineContext, Rule, Violation};
///
/// pub struct NoTrailingWhitespace;
///
/// impl Rule for NoTrailingWhitespace {
///     fn name(&self) -> &'static str { "no-trailing-whitespace" }
///     fn code(&self) -> &'static str { "PS950" }
///     fn category(&self) -> Category { Category::Whitespace }
///
///     fn check(&self, ctx: &LineContext) -> Vec<Violation> {
///         if !ctx.line.trailing_whitespace {
///             return Vec::new();
///         }
///         vec![Violation::new(
///             self.code(),
///             self.name(),
///             self.category(),
///             self.default_severity(),
///             ctx.line_location(),
///             "trailing whitespace",
///         )]
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the stable kebab-case id of this rule (e.g., "line-length").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PS201").
    fn code(&self) -> &'static str;

    /// Returns the category of this rule.
    fn category(&self) -> Category;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule reads cross-line state. Stateful rules run after
    /// the per-line rules on each line.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Checks one line and returns any violations found.
    fn check(&self, ctx: &LineContext) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
