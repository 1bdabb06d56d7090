//! Whitespace around brackets, punctuation and calls.
//!
//! All three rules work on tokens, so whitespace inside string literals
//! and comments never matches.

use pepcheck_core::syntax::is_keyword;
use pepcheck_core::{Category, Line, LineContext, Rule, Suggestion, TokenKind, Violation};

fn whitespace_violation(
    rule: &dyn Rule,
    ctx: &LineContext,
    from: usize,
    to: usize,
    message: String,
) -> Violation {
    Violation::new(
        rule.code(),
        rule.name(),
        rule.category(),
        rule.default_severity(),
        ctx.location_at(from, to - from),
        message,
    )
}

/// Byte range of the whitespace before token `index`.
fn gap_range(line: &Line, index: usize) -> (usize, usize) {
    (line.tokens[index - 1].end, line.tokens[index].start)
}

/// No whitespace immediately inside `()`, `[]` or `{}`.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceBrackets;

impl WhitespaceBrackets {
    /// Rule id.
    pub const NAME: &'static str = "whitespace-brackets";
    /// Rule code.
    pub const CODE: &'static str = "PS601";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for WhitespaceBrackets {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Whitespace
    }

    fn description(&self) -> &'static str {
        "No whitespace immediately inside brackets"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let tokens = &line.tokens;
        let mut violations = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Open => {
                    let Some(next) = tokens.get(i + 1) else { continue };
                    if next.kind == TokenKind::Comment || line.gap_before(i + 1) == Some(0) {
                        continue;
                    }
                    let (from, to) = gap_range(line, i + 1);
                    violations.push(whitespace_violation(
                        self,
                        ctx,
                        from,
                        to,
                        format!("whitespace after `{}`", line.token_text(token)),
                    ));
                }
                TokenKind::Close if i > 0 => {
                    let prev = &tokens[i - 1];
                    if matches!(prev.kind, TokenKind::Comma | TokenKind::Open)
                        || line.gap_before(i) == Some(0)
                    {
                        continue;
                    }
                    let (from, to) = gap_range(line, i);
                    violations.push(whitespace_violation(
                        self,
                        ctx,
                        from,
                        to,
                        format!("whitespace before `{}`", line.token_text(token)),
                    ));
                }
                _ => {}
            }
        }
        violations
    }
}

/// Exactly one space after `,`, `;` and `:`, and none before.
#[derive(Debug, Clone, Default)]
pub struct WhitespacePunct;

impl WhitespacePunct {
    /// Rule id.
    pub const NAME: &'static str = "whitespace-punct";
    /// Rule code.
    pub const CODE: &'static str = "PS602";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for WhitespacePunct {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Whitespace
    }

    fn description(&self) -> &'static str {
        "Exactly one space after commas, colons and semicolons, none before"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let tokens = &line.tokens;
        let mut violations = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Comma | TokenKind::Semicolon => {}
                // Slices: `items[1:2]`
                TokenKind::Colon if token.enclosing != Some('[') => {}
                _ => continue,
            }
            let punct = line.token_text(token);

            if i > 0 && line.gap_before(i).is_some_and(|gap| gap > 0) {
                let (from, to) = gap_range(line, i);
                violations.push(
                    whitespace_violation(self, ctx, from, to, format!("whitespace before `{punct}`"))
                        .with_suggestion(Suggestion::new(format!(
                            "Remove the space before `{punct}`"
                        ))),
                );
            }

            let Some(next) = tokens.get(i + 1) else { continue };
            if matches!(next.kind, TokenKind::Close | TokenKind::Comment) {
                continue;
            }
            match line.gap_before(i + 1) {
                Some(0) => violations.push(
                    whitespace_violation(
                        self,
                        ctx,
                        token.start,
                        token.end,
                        format!("missing whitespace after `{punct}`"),
                    )
                    .with_suggestion(Suggestion::new(format!("Add one space after `{punct}`"))),
                ),
                Some(gap) if gap > 1 => {
                    let (from, to) = gap_range(line, i + 1);
                    violations.push(whitespace_violation(
                        self,
                        ctx,
                        from,
                        to,
                        format!("multiple spaces after `{punct}`"),
                    ));
                }
                _ => {}
            }
        }
        violations
    }
}

/// No whitespace between a callable and its opening parenthesis.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceCall;

impl WhitespaceCall {
    /// Rule id.
    pub const NAME: &'static str = "whitespace-call";
    /// Rule code.
    pub const CODE: &'static str = "PS603";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for WhitespaceCall {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Whitespace
    }

    fn description(&self) -> &'static str {
        "No whitespace between a callable and its argument list"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let tokens = &line.tokens;

        tokens
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, token)| {
                if !token.is_bracket(line, '(') || token.kind != TokenKind::Open {
                    return false;
                }
                if line.gap_before(*i).map_or(true, |gap| gap == 0) {
                    return false;
                }
                let prev = &tokens[i - 1];
                match prev.kind {
                    TokenKind::Name => {
                        let word = line.token_text(prev);
                        !is_keyword(word) && !matches!(word, "match" | "case")
                    }
                    TokenKind::Close => true,
                    _ => false,
                }
            })
            .map(|(i, _)| {
                let (from, to) = gap_range(line, i);
                whitespace_violation(self, ctx, from, to, "whitespace before `(`".to_string())
                    .with_suggestion(Suggestion::new("Remove the space before the argument list"))
            })
            .collect()
    }
}
