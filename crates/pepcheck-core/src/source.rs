//! Scanned source representation: files, lines and tokens.
//!
//! Everything here is produced once by [`crate::scanner`] and never mutated
//! afterwards. Token offsets are byte offsets into the owning line's text;
//! reported columns are 1-indexed character positions.

use std::fmt;

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword.
    Name,
    /// Numeric literal.
    Number,
    /// String literal span, including prefix and delimiters.
    Str,
    /// `(`, `[` or `{`.
    Open,
    /// `)`, `]` or `}`.
    Close,
    /// `,`
    Comma,
    /// `:` (but not `:=`).
    Colon,
    /// `;`
    Semicolon,
    /// Any other operator, including `=`, `==`, `.`, `@` and `->`.
    Operator,
    /// A `#` comment running to the end of the line.
    Comment,
    /// A line-continuation backslash outside of strings.
    Backslash,
}

/// A lexical unit inside a [`Line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical class.
    pub kind: TokenKind,
    /// Start byte offset within the line (0-based).
    pub start: usize,
    /// End byte offset within the line (exclusive).
    pub end: usize,
    /// Number of open brackets enclosing the token.
    pub depth: usize,
    /// Innermost open bracket enclosing the token. For a closing bracket
    /// this is the bracket it closes.
    pub enclosing: Option<char>,
}

impl Token {
    /// Returns true if the token is a bracket of the given character.
    #[must_use]
    pub fn is_bracket(&self, line: &Line, bracket: char) -> bool {
        matches!(self.kind, TokenKind::Open | TokenKind::Close)
            && line.token_text(self).starts_with(bracket)
    }
}

/// Leading whitespace of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indent {
    /// Number of leading space/tab characters (tabs count as one).
    pub width: usize,
    /// First whitespace character, if any.
    pub first_char: Option<char>,
    /// Whether any tab is present in the leading whitespace.
    pub has_tab: bool,
    /// Whether tabs and spaces are mixed.
    pub mixed: bool,
}

/// Coarse classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Only whitespace, outside of any string literal.
    Blank,
    /// Starts with a comment.
    Comment,
    /// Part of a bare string statement (docstring-like).
    DocString,
    /// Anything else.
    Code,
}

/// One physical line of a [`SourceFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    /// Raw text without the line terminator.
    pub text: String,
    /// Byte offset of the line start within the source.
    pub offset: usize,
    /// Leading whitespace.
    pub indent: Indent,
    /// Whether the line ends with spaces or tabs.
    pub trailing_whitespace: bool,
    /// Length in characters; tabs are counted, not expanded.
    pub visible_length: usize,
    /// Coarse classification.
    pub kind: LineKind,
    /// Lexical tokens, in order.
    pub tokens: Vec<Token>,
    /// Whether the line continues a statement begun on an earlier line.
    pub continuation: bool,
    /// Whether the line begins inside a multi-line string literal.
    pub starts_in_string: bool,
    /// Bracket depth at the start of the line.
    pub depth_at_start: usize,
}

impl Line {
    /// Returns the source text of a token.
    #[must_use]
    pub fn token_text(&self, token: &Token) -> &str {
        &self.text[token.start..token.end]
    }

    /// Returns the text of the token at `index`, or `""`.
    #[must_use]
    pub fn text_at(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| self.token_text(t))
    }

    /// Returns true if the line is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank
    }

    /// Returns true if the line begins a new logical statement.
    #[must_use]
    pub fn starts_statement(&self) -> bool {
        !self.continuation && matches!(self.kind, LineKind::Code | LineKind::DocString)
    }

    /// Converts a byte offset within the line into a 1-based column.
    #[must_use]
    pub fn column(&self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        self.text[..byte].chars().count() + 1
    }

    /// Number of characters between the end of token `index - 1` and the
    /// start of token `index`, or `None` for the first token.
    #[must_use]
    pub fn gap_before(&self, index: usize) -> Option<usize> {
        if index == 0 {
            return None;
        }
        let prev = self.tokens.get(index - 1)?;
        let tok = self.tokens.get(index)?;
        Some(self.text[prev.end..tok.start].chars().count())
    }

    /// Returns the last token that is not a comment.
    #[must_use]
    pub fn last_code_token(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Comment)
    }

    /// Returns the comment token of the line, if any.
    #[must_use]
    pub fn comment(&self) -> Option<(usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .rev()
            .find(|(_, t)| t.kind == TokenKind::Comment)
    }

    /// Returns true if the line ends with a continuation backslash.
    #[must_use]
    pub fn ends_with_backslash(&self) -> bool {
        self.last_code_token()
            .is_some_and(|t| t.kind == TokenKind::Backslash)
    }
}

/// Lexical problem that keeps the scan from being fully trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// A string literal that never closes.
    UnterminatedString,
    /// An opening bracket that is still open at end of input.
    UnclosedBracket(char),
    /// A closing bracket without a matching opener.
    UnmatchedClose(char),
}

/// First malformed construct found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    /// Line where the construct begins.
    pub line: usize,
    /// What went wrong.
    pub kind: MalformedKind,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MalformedKind::UnterminatedString => {
                write!(f, "unterminated string literal starting on line {}", self.line)
            }
            MalformedKind::UnclosedBracket(c) => {
                write!(f, "'{c}' opened on line {} is never closed", self.line)
            }
            MalformedKind::UnmatchedClose(c) => {
                write!(f, "unmatched '{c}' on line {}", self.line)
            }
        }
    }
}

/// A scanned unit of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Opaque identifier used for reporting.
    pub identifier: String,
    /// Lines in order.
    pub lines: Vec<Line>,
    /// First malformed construct, if any.
    pub malformed: Option<Malformed>,
}

impl SourceFile {
    /// Returns the line with the given 1-based number.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&Line> {
        number.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Returns true if the file has no non-blank lines.
    #[must_use]
    pub fn is_all_blank(&self) -> bool {
        self.lines.iter().all(Line::is_blank)
    }

    /// Number of the last line, or 0 for empty input.
    #[must_use]
    pub fn last_line_number(&self) -> usize {
        self.lines.len()
    }
}
