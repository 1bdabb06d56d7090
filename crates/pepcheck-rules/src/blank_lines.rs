//! Blank-line cadence rules.
//!
//! All three rules read the blank-line counters kept by the evaluator.
//! Blank lines are counted through a comment block that directly precedes
//! a statement, so a comment attached to a function does not reset them.

use pepcheck_core::state::{BlockKind, StatementKind};
use pepcheck_core::{Category, LineContext, Rule, Suggestion, Violation};

fn definition_location(ctx: &LineContext) -> pepcheck_core::Location {
    let token = ctx.line.tokens.first();
    token.map_or_else(|| ctx.line_location(), |t| ctx.token_location(t))
}

/// Exactly two blank lines before a top-level function or class.
#[derive(Debug, Clone, Default)]
pub struct BlankLinesTop;

impl BlankLinesTop {
    /// Rule id.
    pub const NAME: &'static str = "blank-lines-top";
    /// Rule code.
    pub const CODE: &'static str = "PS301";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BlankLinesTop {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::BlankLines
    }

    fn description(&self) -> &'static str {
        "Top-level function and class definitions are preceded by two blank lines"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let state = ctx.state;
        if !ctx.line.starts_statement() || ctx.line.indent.width != 0 || !state.seen_code {
            return Vec::new();
        }
        let Some(statement) = &state.statement else {
            return Vec::new();
        };
        if !matches!(
            statement.kind,
            StatementKind::Class | StatementKind::Function | StatementKind::Decorator
        ) {
            return Vec::new();
        }
        if state
            .previous
            .as_ref()
            .is_some_and(|p| p.kind == StatementKind::Decorator)
        {
            return Vec::new();
        }
        if state.blank_before == 2 {
            return Vec::new();
        }

        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            definition_location(ctx),
            format!(
                "expected 2 blank lines before top-level definition, found {}",
                state.blank_before
            ),
        )
        .with_suggestion(Suggestion::new(
            "Separate top-level definitions with exactly two blank lines",
        ))]
    }
}

/// Exactly one blank line between methods inside a class body.
#[derive(Debug, Clone, Default)]
pub struct BlankLinesMethod;

impl BlankLinesMethod {
    /// Rule id.
    pub const NAME: &'static str = "blank-lines-method";
    /// Rule code.
    pub const CODE: &'static str = "PS302";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BlankLinesMethod {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::BlankLines
    }

    fn description(&self) -> &'static str {
        "Method definitions inside a class are separated by one blank line"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let state = ctx.state;
        if !ctx.line.starts_statement() {
            return Vec::new();
        }
        let Some(statement) = &state.statement else {
            return Vec::new();
        };
        if !matches!(
            statement.kind,
            StatementKind::Function | StatementKind::Decorator
        ) {
            return Vec::new();
        }
        let Some(class) = state.blocks.last().filter(|b| b.kind == BlockKind::Class) else {
            return Vec::new();
        };
        let follows_header_or_decorator = state
            .previous
            .as_ref()
            .map_or(true, |p| p.line == class.line || p.kind == StatementKind::Decorator);
        if follows_header_or_decorator || state.blank_before == 1 {
            return Vec::new();
        }

        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            definition_location(ctx),
            format!(
                "expected 1 blank line before method definition, found {}",
                state.blank_before
            ),
        )]
    }
}

/// No run of three or more consecutive blank lines.
#[derive(Debug, Clone)]
pub struct NoMultiBlank {
    /// Length of the shortest forbidden run.
    pub max_run: usize,
}

impl Default for NoMultiBlank {
    fn default() -> Self {
        Self::new()
    }
}

impl NoMultiBlank {
    /// Rule id.
    pub const NAME: &'static str = "no-multi-blank";
    /// Rule code.
    pub const CODE: &'static str = "PS303";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self { max_run: 3 }
    }
}

impl Rule for NoMultiBlank {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::BlankLines
    }

    fn description(&self) -> &'static str {
        "No run of three or more consecutive blank lines"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        if !ctx.line.is_blank() || ctx.state.blank_run != self.max_run {
            return Vec::new();
        }
        // Nothing to anchor against in a file of only blank lines.
        if ctx.file.is_all_blank() {
            return Vec::new();
        }
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.line_location(),
            format!("too many blank lines ({} or more in a row)", self.max_run),
        )]
    }
}
