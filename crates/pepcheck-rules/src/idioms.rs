//! Idiom preferences: identity comparisons and continuation style.

use pepcheck_core::{
    Category, Line, LineContext, Rule, Severity, Suggestion, Token, TokenKind, Violation,
};

/// Returns the text of token `index` if it is one of `literals`.
fn literal_at<'a>(line: &'a Line, index: usize, literals: &[&str]) -> Option<&'a str> {
    let token = line.tokens.get(index)?;
    let text = line.token_text(token);
    (token.kind == TokenKind::Name && literals.contains(&text)).then_some(text)
}

/// Finds `==`/`!=` comparisons where one side is one of `literals`.
///
/// Yields the operator token and the literal it is compared against.
fn literal_comparisons<'a>(
    line: &'a Line,
    literals: &'a [&'a str],
) -> impl Iterator<Item = (&'a Token, &'a str)> + 'a {
    line.tokens.iter().enumerate().filter_map(move |(i, token)| {
        if token.kind != TokenKind::Operator || !matches!(line.token_text(token), "==" | "!=") {
            return None;
        }
        literal_at(line, i + 1, literals)
            .or_else(|| i.checked_sub(1).and_then(|j| literal_at(line, j, literals)))
            .map(|literal| (token, literal))
    })
}

/// No `== True` / `== False`.
#[derive(Debug, Clone, Default)]
pub struct NoBoolLiteralCompare;

impl NoBoolLiteralCompare {
    /// Rule id.
    pub const NAME: &'static str = "no-bool-literal-compare";
    /// Rule code.
    pub const CODE: &'static str = "PS901";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NoBoolLiteralCompare {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Other
    }

    fn description(&self) -> &'static str {
        "Boolean values are not compared to True or False with =="
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        literal_comparisons(ctx.line, &["True", "False"])
            .map(|(op, literal)| {
                let operator = ctx.line.token_text(op);
                Violation::new(
                    Self::CODE,
                    Self::NAME,
                    self.category(),
                    self.default_severity(),
                    ctx.token_location(op),
                    format!("comparison to `{literal}` with `{operator}`"),
                )
                .with_suggestion(Suggestion::new(
                    "Use the value directly: `if cond:` or `if not cond:`",
                ))
            })
            .collect()
    }
}

/// Comparisons to `None` use `is` / `is not`.
#[derive(Debug, Clone, Default)]
pub struct UseIsForNone;

impl UseIsForNone {
    /// Rule id.
    pub const NAME: &'static str = "use-is-for-none";
    /// Rule code.
    pub const CODE: &'static str = "PS902";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for UseIsForNone {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Other
    }

    fn description(&self) -> &'static str {
        "Comparisons to None use 'is' or 'is not'"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        literal_comparisons(ctx.line, &["None"])
            .map(|(op, _)| {
                let operator = ctx.line.token_text(op);
                let identity = if operator == "==" { "is" } else { "is not" };
                Violation::new(
                    Self::CODE,
                    Self::NAME,
                    self.category(),
                    self.default_severity(),
                    ctx.token_location(op),
                    format!("comparison to `None` should use `{identity}`, not `{operator}`"),
                )
                .with_suggestion(Suggestion::new(format!("Replace `{operator}` with `{identity}`")))
            })
            .collect()
    }
}

/// No backslash line continuation where brackets would do.
///
/// `with` and `assert` statements are exempt: before parenthesised context
/// managers a backslash was the only way to split them.
#[derive(Debug, Clone, Default)]
pub struct NoBackslashContinuation;

impl NoBackslashContinuation {
    /// Rule id.
    pub const NAME: &'static str = "no-backslash-continuation";
    /// Rule code.
    pub const CODE: &'static str = "PS903";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NoBackslashContinuation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Other
    }

    fn description(&self) -> &'static str {
        "Lines are continued inside brackets, not with a backslash"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let Some(token) = line.last_code_token().filter(|t| t.kind == TokenKind::Backslash) else {
            return Vec::new();
        };
        let exempt = ctx
            .state
            .statement
            .as_ref()
            .is_some_and(|s| matches!(s.first_word.as_str(), "with" | "assert"));
        if exempt {
            return Vec::new();
        }

        let violation = if token.depth > 0 {
            Violation::new(
                Self::CODE,
                Self::NAME,
                self.category(),
                self.default_severity(),
                ctx.token_location(token),
                "redundant backslash inside brackets",
            )
            .with_suggestion(Suggestion::new("Remove the backslash"))
        } else {
            Violation::new(
                Self::CODE,
                Self::NAME,
                self.category(),
                self.default_severity(),
                ctx.token_location(token),
                "backslash line continuation",
            )
            .with_suggestion(Suggestion::new(
                "Wrap the expression in parentheses instead",
            ))
        };
        vec![violation]
    }
}
