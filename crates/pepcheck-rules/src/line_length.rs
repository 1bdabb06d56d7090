//! Maximum line length.
//!
//! # Configuration
//!
//! - `max_line_length`: limit for code lines (default: 79)
//! - `max_doc_length`: limit for comment and docstring lines (default: 72)

use pepcheck_core::{Category, LineContext, LineKind, Rule, Suggestion, Violation};

/// Code lines are at most 79 characters; comment and docstring lines 72.
#[derive(Debug, Clone)]
pub struct LineLength {
    /// Limit for code lines.
    pub max_line_length: usize,
    /// Limit for comment and docstring lines.
    pub max_doc_length: usize,
}

impl Default for LineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLength {
    /// Rule id.
    pub const NAME: &'static str = "line-length";
    /// Rule code.
    pub const CODE: &'static str = "PS201";

    /// Creates a new rule with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_line_length: 79,
            max_doc_length: 72,
        }
    }

    /// Sets the code line limit.
    #[must_use]
    pub fn max_line_length(mut self, limit: usize) -> Self {
        self.max_line_length = limit;
        self
    }

    /// Sets the comment/docstring line limit.
    #[must_use]
    pub fn max_doc_length(mut self, limit: usize) -> Self {
        self.max_doc_length = limit;
        self
    }
}

/// A comment line holding a single long URL cannot be wrapped.
fn is_unbreakable_url(text: &str) -> bool {
    let body = text.trim_start().trim_start_matches('#').trim();
    !body.is_empty() && !body.contains(char::is_whitespace) && body.contains("://")
}

impl Rule for LineLength {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::LineLength
    }

    fn description(&self) -> &'static str {
        "Code lines are at most 79 characters; comments and docstrings at most 72"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let (limit, what) = match line.kind {
            LineKind::Comment | LineKind::DocString => (self.max_doc_length, "comment/docstring"),
            LineKind::Blank | LineKind::Code => (self.max_line_length, "code"),
        };
        if line.visible_length <= limit {
            return Vec::new();
        }
        if line.kind == LineKind::Comment && is_unbreakable_url(&line.text) {
            return Vec::new();
        }

        let start = line
            .text
            .char_indices()
            .nth(limit)
            .map_or(line.text.len(), |(b, _)| b);
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.location_at(start, line.text.len() - start),
            format!(
                "{what} line too long ({} > {limit} characters)",
                line.visible_length
            ),
        )
        .with_suggestion(Suggestion::new(
            "Wrap the line inside parentheses, brackets or braces",
        ))]
    }
}
