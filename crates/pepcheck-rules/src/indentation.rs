//! Indentation rules.
//!
//! # Rationale
//!
//! Four-space indentation is the single most visible convention of the
//! style guide. Tabs render differently across editors and are never
//! accepted, even when they happen to line up.

use pepcheck_core::{Category, LineContext, Rule, Suggestion, Violation};

/// Every indentation run is a multiple of the indent width; never tabs.
///
/// Continuation lines inside brackets are exempt from the width check so
/// that visual alignment stays possible, but not from the tab check.
#[derive(Debug, Clone)]
pub struct IndentWidth {
    /// Width of one indentation level.
    pub width: usize,
}

impl Default for IndentWidth {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentWidth {
    /// Rule id.
    pub const NAME: &'static str = "indent-width";
    /// Rule code.
    pub const CODE: &'static str = "PS101";

    /// Creates a new rule with a width of 4.
    #[must_use]
    pub fn new() -> Self {
        Self { width: 4 }
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    fn violation(&self, ctx: &LineContext, message: String) -> Violation {
        let indent_bytes = ctx.line.text.len() - ctx.line.text.trim_start().len();
        Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.location_at(0, indent_bytes),
            message,
        )
    }
}

impl Rule for IndentWidth {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Indentation
    }

    fn description(&self) -> &'static str {
        "Indentation uses multiples of four spaces and never tabs"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        if line.starts_in_string || line.is_blank() || line.indent.width == 0 {
            return Vec::new();
        }

        if line.indent.has_tab {
            let message = if line.indent.mixed {
                "indentation mixes tabs and spaces"
            } else {
                "indentation contains tabs"
            };
            return vec![self
                .violation(ctx, message.to_string())
                .with_suggestion(Suggestion::new(format!(
                    "Indent with {} spaces per level",
                    self.width
                )))];
        }

        if line.continuation {
            return Vec::new();
        }

        if line.indent.width % self.width != 0 {
            return vec![self.violation(
                ctx,
                format!(
                    "indentation is not a multiple of {} (found {} spaces)",
                    self.width, line.indent.width
                ),
            )];
        }

        if line.starts_statement() && ctx.state.dedent_mismatch {
            return vec![self.violation(
                ctx,
                "unindent does not match any outer indentation level".to_string(),
            )];
        }

        Vec::new()
    }
}
