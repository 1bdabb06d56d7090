//! Shallow statement recognizers built on top of scanned tokens.
//!
//! These helpers look at a single statement-start line and recover just
//! enough structure (assignment targets, literal values) for the naming
//! rules. They never look past the current line.

use crate::source::{Line, Token, TokenKind};

/// Reserved words of the checked language.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Returns true if `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Kind of assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `x = value`
    Plain,
    /// `x: T` or `x: T = value`
    Annotated,
    /// `x += value` and friends
    Augmented,
}

/// A binding statement recognised on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Token indices of the names being bound.
    pub targets: Vec<usize>,
    /// Operator kind.
    pub op: AssignOp,
    /// Index of the first value token, if the statement has a value.
    pub value: Option<usize>,
    /// Whether the target side is exactly one bare name.
    pub single: bool,
    /// Whether the value is a single literal.
    pub literal: bool,
}

const AUGMENTED: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "|=", "^=", "@=",
];

impl Assignment {
    /// Recognises an assignment on a statement-start line.
    #[must_use]
    pub fn parse(line: &Line) -> Option<Self> {
        let tokens = &line.tokens;
        let first = tokens.first()?;
        if first.kind != TokenKind::Name || is_keyword(line.token_text(first)) {
            return None;
        }

        let top = |t: &Token| t.depth == line.depth_at_start;
        let (split, op) = tokens.iter().enumerate().find_map(|(i, t)| {
            if !top(t) {
                return None;
            }
            let text = line.token_text(t);
            match t.kind {
                TokenKind::Operator if text == "=" => Some((i, AssignOp::Plain)),
                TokenKind::Operator if AUGMENTED.contains(&text) => Some((i, AssignOp::Augmented)),
                TokenKind::Colon => Some((i, AssignOp::Annotated)),
                _ => None,
            }
        })?;

        let value = match op {
            AssignOp::Annotated => tokens[split + 1..]
                .iter()
                .position(|t| top(t) && t.kind == TokenKind::Operator && line.token_text(t) == "=")
                .map(|p| split + p + 2),
            AssignOp::Plain | AssignOp::Augmented => Some(split + 1),
        };

        let targets = Self::targets(line, 0, split)?;
        if targets.is_empty() {
            return None;
        }
        let single = split == 1;
        if op == AssignOp::Annotated && !single {
            return None;
        }

        // Chained `a = b = 1`: later segments also bind names.
        let mut targets = targets;
        let mut value = value;
        if op == AssignOp::Plain {
            while let Some(start) = value {
                let next = tokens[start..].iter().position(|t| {
                    top(t) && t.kind == TokenKind::Operator && line.token_text(t) == "="
                });
                let Some(offset) = next else { break };
                match Self::targets(line, start, start + offset) {
                    Some(more) if !more.is_empty() => {
                        targets.extend(more);
                        value = Some(start + offset + 1);
                    }
                    _ => break,
                }
            }
        }

        let literal = value.is_some_and(|start| is_literal(line, &tokens[start..]));
        let single = single && targets.len() == 1;
        Some(Self {
            targets,
            op,
            value,
            single,
            literal,
        })
    }

    /// Returns the bound names in order.
    #[must_use]
    pub fn names<'a>(&self, line: &'a Line) -> Vec<&'a str> {
        self.targets.iter().map(|&i| line.text_at(i)).collect()
    }

    /// Collects bound names in `line.tokens[start..end]`.
    fn targets(line: &Line, start: usize, end: usize) -> Option<Vec<usize>> {
        let tokens = &line.tokens;
        let mut names = Vec::new();
        // Depth of a call or subscript bracket being skipped.
        let mut skip: Option<usize> = None;
        for i in start..end {
            let token = &tokens[i];
            if let Some(depth) = skip {
                if token.kind == TokenKind::Close && token.depth == depth {
                    skip = None;
                }
                continue;
            }
            match token.kind {
                TokenKind::Name => {
                    if is_keyword(line.token_text(token)) {
                        return None;
                    }
                    let after_dot = i > start && line.text_at(i - 1) == ".";
                    let accessed = i + 1 < end
                        && tokens[i + 1].kind == TokenKind::Open
                        && matches!(line.text_at(i + 1), "[" | "(");
                    if accessed {
                        skip = Some(tokens[i + 1].depth);
                    } else if !after_dot && line.text_at(i + 1) != "." {
                        names.push(i);
                    }
                }
                TokenKind::Open if i > start && tokens[i - 1].kind == TokenKind::Close => {
                    skip = Some(token.depth);
                }
                TokenKind::Comma | TokenKind::Open | TokenKind::Close => {}
                TokenKind::Operator if matches!(line.token_text(token), "*" | ".") => {}
                _ => return None,
            }
        }
        Some(names)
    }
}

/// Returns true if `tokens` (a statement's value part) is one literal.
fn is_literal(line: &Line, tokens: &[Token]) -> bool {
    let mut code = tokens.iter().filter(|t| t.kind != TokenKind::Comment).peekable();
    if code
        .peek()
        .is_some_and(|t| t.kind == TokenKind::Operator && matches!(line.token_text(t), "-" | "+"))
    {
        code.next();
    }
    let rest: Vec<&Token> = code.collect();
    match rest.as_slice() {
        [] => false,
        [single] => match single.kind {
            TokenKind::Number | TokenKind::Str => true,
            TokenKind::Name => matches!(line.token_text(single), "True" | "False" | "None"),
            _ => false,
        },
        many => many.iter().all(|t| t.kind == TokenKind::Str),
    }
}
