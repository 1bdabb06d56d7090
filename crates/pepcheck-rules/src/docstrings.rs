//! Docstring delimiters.

use pepcheck_core::state::StatementKind;
use pepcheck_core::{Category, LineContext, LineKind, Rule, Severity, Suggestion, Violation};

/// Module, class and function docstrings use `"""triple double quotes"""`.
#[derive(Debug, Clone, Default)]
pub struct DocstringQuotes;

impl DocstringQuotes {
    /// Rule id.
    pub const NAME: &'static str = "docstring-quotes";
    /// Rule code.
    pub const CODE: &'static str = "PS801";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Whether the docstring statement on this line documents a module,
/// class or function.
fn is_docstring_position(ctx: &LineContext) -> bool {
    let state = ctx.state;
    match &state.previous {
        None => ctx.line.indent.width == 0,
        Some(previous) => {
            matches!(previous.kind, StatementKind::Class | StatementKind::Function)
                && previous.ends_with_colon
                && ctx.line.indent.width > previous.indent
        }
    }
}

impl Rule for DocstringQuotes {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Docstrings
    }

    fn description(&self) -> &'static str {
        "Docstrings use triple double quotes"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        if line.kind != LineKind::DocString || !line.starts_statement() {
            return Vec::new();
        }
        if !is_docstring_position(ctx) {
            return Vec::new();
        }
        let Some(token) = line.tokens.first() else {
            return Vec::new();
        };
        let literal = line
            .token_text(token)
            .trim_start_matches(|c: char| c.is_ascii_alphabetic());
        if literal.starts_with("\"\"\"") {
            return Vec::new();
        }
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.token_location(token),
            "docstring should use triple double quotes",
        )
        .with_suggestion(Suggestion::new("Write docstrings as \"\"\"...\"\"\""))]
    }
}
