//! Line and token scanner.
//!
//! Turns raw source text into a [`SourceFile`]. The lexer is deliberately
//! shallow: it tracks string and bracket state across lines so that later
//! rules never look inside literals or comments, but it does not build a
//! syntax tree.

use crate::source::{
    Indent, Line, LineKind, Malformed, MalformedKind, SourceFile, Token, TokenKind,
};
use thiserror::Error;

/// How the scanner should treat encoding declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingHint {
    /// Input is asserted to be UTF-8; coding declarations are ignored.
    Utf8,
    /// Honour a coding declaration on line 1 or 2 and reject anything
    /// that is not UTF-8 compatible.
    #[default]
    Declared,
}

/// Errors that abort scanning of a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The input bytes are not valid UTF-8.
    #[error("invalid UTF-8 sequence at line {line}, column {column}")]
    InvalidUtf8 {
        /// Line of the first invalid byte (1-indexed).
        line: usize,
        /// Column of the first invalid byte (1-indexed).
        column: usize,
    },

    /// A coding declaration names an encoding other than UTF-8.
    #[error("unsupported source encoding `{encoding}` declared on line {line}; source must be UTF-8")]
    UnsupportedDeclaration {
        /// The declared encoding name.
        encoding: String,
        /// Line carrying the declaration.
        line: usize,
    },
}

/// Encodings accepted in a coding declaration.
const ACCEPTED_ENCODINGS: &[&str] = &["utf-8", "utf8", "utf-8-sig", "ascii", "us-ascii"];

const THREE_CHAR_OPERATORS: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];

const TWO_CHAR_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "**", "//", "<<", ">>", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "@=", "->",
];

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Scans raw bytes into a [`SourceFile`].
///
/// # Errors
///
/// Returns [`EncodingError`] if the bytes are not valid UTF-8, or if `hint`
/// is [`EncodingHint::Declared`] and the source declares another encoding.
pub fn scan(input: &[u8], identifier: &str, hint: EncodingHint) -> Result<SourceFile, EncodingError> {
    let text =
        std::str::from_utf8(input).map_err(|e| invalid_utf8(input, e.valid_up_to()))?;
    if hint == EncodingHint::Declared {
        check_declaration(text)?;
    }
    Ok(scan_str(text, identifier))
}

/// Scans text that is already known to be valid UTF-8.
#[must_use]
pub fn scan_str(text: &str, identifier: &str) -> SourceFile {
    let (body, mut offset) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (rest, '\u{feff}'.len_utf8()),
        None => (text, 0),
    };

    let segments = split_lines(body);
    let mut lexer = Lexer::default();
    let mut lines = Vec::with_capacity(segments.len());
    for (index, (content, terminator)) in segments.into_iter().enumerate() {
        lines.push(lexer.line(index + 1, content, offset));
        offset += content.len() + terminator;
    }
    lexer.finish();

    SourceFile {
        identifier: identifier.to_string(),
        lines,
        malformed: lexer.malformed,
    }
}

/// Splits `text` into lines, returning each line's content and the byte
/// length of its terminator. `\n`, `\r\n` and a lone `\r` all end a line;
/// a final unterminated line reports a terminator length of 0.
fn split_lines(text: &str) -> Vec<(&str, usize)> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let terminator = match bytes[i] {
            b'\n' => 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        lines.push((&text[start..i], terminator));
        i += terminator;
        start = i;
    }
    if start < bytes.len() {
        lines.push((&text[start..], 0));
    }
    lines
}

fn invalid_utf8(input: &[u8], valid_up_to: usize) -> EncodingError {
    let prefix = std::str::from_utf8(&input[..valid_up_to]).unwrap_or_default();
    let complete = split_lines(prefix);
    let (line, last) = match complete.last() {
        Some((content, 0)) => (complete.len(), *content),
        _ => (complete.len() + 1, ""),
    };
    let column = last.chars().count() + 1;
    EncodingError::InvalidUtf8 { line, column }
}

fn check_declaration(text: &str) -> Result<(), EncodingError> {
    for (index, (line, _)) in split_lines(text).into_iter().take(2).enumerate() {
        let trimmed = line.trim_start_matches('\u{feff}').trim_start();
        if !trimmed.starts_with('#') {
            continue;
        }
        if let Some(encoding) = coding_cookie(trimmed) {
            let normalized = encoding.to_ascii_lowercase().replace('_', "-");
            if !ACCEPTED_ENCODINGS.contains(&normalized.as_str()) {
                return Err(EncodingError::UnsupportedDeclaration {
                    encoding,
                    line: index + 1,
                });
            }
        }
    }
    Ok(())
}

/// Extracts the encoding name from a `coding[:=] name` comment.
fn coding_cookie(comment: &str) -> Option<String> {
    let at = comment.find("coding")?;
    let rest = &comment[at + "coding".len()..];
    let rest = rest.strip_prefix(':').or_else(|| rest.strip_prefix('='))?;
    let name: String = rest
        .trim_start_matches([' ', '\t'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!name.is_empty()).then_some(name)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn closes(open: char, close: char) -> bool {
    matches!((open, close), ('(', ')') | ('[', ']') | ('{', '}'))
}

fn compute_indent(text: &str) -> Indent {
    let mut indent = Indent::default();
    let mut has_space = false;
    for c in text.chars() {
        match c {
            ' ' => has_space = true,
            '\t' => indent.has_tab = true,
            _ => break,
        }
        indent.width += 1;
        indent.first_char.get_or_insert(c);
    }
    indent.mixed = indent.has_tab && has_space;
    indent
}

#[derive(Debug, Clone, Copy)]
struct OpenString {
    quote: char,
    triple: bool,
    line: usize,
    statement: bool,
}

#[derive(Debug, Default)]
struct Lexer {
    brackets: Vec<(char, usize)>,
    string: Option<OpenString>,
    backslash_pending: bool,
    malformed: Option<Malformed>,
}

impl Lexer {
    fn note(&mut self, line: usize, kind: MalformedKind) {
        if self.malformed.map_or(true, |m| line < m.line) {
            self.malformed = Some(Malformed { line, kind });
        }
    }

    fn finish(&mut self) {
        if let Some(open) = self.string.take() {
            self.note(open.line, MalformedKind::UnterminatedString);
        }
        if let Some(&(bracket, line)) = self.brackets.first() {
            self.note(line, MalformedKind::UnclosedBracket(bracket));
        }
    }

    fn enclosing(&self) -> Option<char> {
        self.brackets.last().map(|&(c, _)| c)
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            start,
            end,
            depth: self.brackets.len(),
            enclosing: self.enclosing(),
        }
    }

    fn line(&mut self, number: usize, text: &str, offset: usize) -> Line {
        let starts_in_string = self.string.is_some();
        let continuation = starts_in_string || !self.brackets.is_empty() || self.backslash_pending;
        let depth_at_start = self.brackets.len();
        self.backslash_pending = false;

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let byte_at = |index: usize| chars.get(index).map_or(text.len(), |&(b, _)| b);
        let mut tokens: Vec<Token> = Vec::new();
        let mut in_docstring = false;
        let mut statement_string = false;
        let mut i = 0;

        if let Some(open) = self.string {
            in_docstring = open.statement;
            let string_token = self.token(TokenKind::Str, 0, 0);
            i = self.string_body(&chars, 0, open);
            if i > 0 {
                tokens.push(Token {
                    end: byte_at(i),
                    ..string_token
                });
            }
        }

        while i < chars.len() {
            let (start, c) = chars[i];
            match c {
                ' ' | '\t' | '\x0c' => i += 1,
                '#' => {
                    tokens.push(self.token(TokenKind::Comment, start, text.len()));
                    break;
                }
                '"' | '\'' => {
                    let statement = tokens.is_empty() && !continuation;
                    statement_string |= statement;
                    let token = self.token(TokenKind::Str, start, start);
                    i = self.string_literal(&chars, i, number, statement);
                    tokens.push(Token {
                        end: byte_at(i),
                        ..token
                    });
                }
                c if is_ident_start(c) => {
                    let word_start = i;
                    while i < chars.len() && is_ident_continue(chars[i].1) {
                        i += 1;
                    }
                    let word = &text[start..byte_at(i)];
                    let quoted = chars.get(i).is_some_and(|&(_, q)| q == '"' || q == '\'');
                    if quoted && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str()) {
                        let statement = tokens.is_empty() && !continuation;
                        statement_string |= statement;
                        let token = self.token(TokenKind::Str, byte_at(word_start), start);
                        i = self.string_literal(&chars, i, number, statement);
                        tokens.push(Token {
                            end: byte_at(i),
                            ..token
                        });
                    } else {
                        tokens.push(self.token(TokenKind::Name, start, byte_at(i)));
                    }
                }
                c if c.is_ascii_digit()
                    || (c == '.' && chars.get(i + 1).is_some_and(|&(_, d)| d.is_ascii_digit())) =>
                {
                    let is_hex = text[start..].starts_with("0x") || text[start..].starts_with("0X");
                    i += 1;
                    while i < chars.len() {
                        let d = chars[i].1;
                        let exponent_sign =
                            matches!(d, '+' | '-') && matches!(chars[i - 1].1, 'e' | 'E') && !is_hex;
                        if d.is_ascii_alphanumeric() || d == '_' || d == '.' || exponent_sign {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    tokens.push(self.token(TokenKind::Number, start, byte_at(i)));
                }
                '(' | '[' | '{' => {
                    tokens.push(self.token(TokenKind::Open, start, start + 1));
                    self.brackets.push((c, number));
                    i += 1;
                }
                ')' | ']' | '}' => {
                    let opener = match self.brackets.last() {
                        Some(&(open, _)) => {
                            if !closes(open, c) {
                                self.note(number, MalformedKind::UnmatchedClose(c));
                            }
                            self.brackets.pop();
                            Some(open)
                        }
                        None => {
                            self.note(number, MalformedKind::UnmatchedClose(c));
                            None
                        }
                    };
                    tokens.push(Token {
                        enclosing: opener,
                        ..self.token(TokenKind::Close, start, start + 1)
                    });
                    i += 1;
                }
                ',' => {
                    tokens.push(self.token(TokenKind::Comma, start, start + 1));
                    i += 1;
                }
                ';' => {
                    tokens.push(self.token(TokenKind::Semicolon, start, start + 1));
                    i += 1;
                }
                ':' if chars.get(i + 1).is_some_and(|&(_, n)| n == '=') => {
                    tokens.push(self.token(TokenKind::Operator, start, start + 2));
                    i += 2;
                }
                ':' => {
                    tokens.push(self.token(TokenKind::Colon, start, start + 1));
                    i += 1;
                }
                '\\' => {
                    tokens.push(self.token(TokenKind::Backslash, start, start + 1));
                    i += 1;
                    if text[byte_at(i)..].trim().is_empty() {
                        self.backslash_pending = true;
                    }
                }
                _ => {
                    let rest = &text[start..];
                    let len = THREE_CHAR_OPERATORS
                        .iter()
                        .chain(TWO_CHAR_OPERATORS)
                        .find(|op| rest.starts_with(**op))
                        .map_or(c.len_utf8(), |op| op.len());
                    tokens.push(self.token(TokenKind::Operator, start, start + len));
                    while i < chars.len() && chars[i].0 < start + len {
                        i += 1;
                    }
                }
            }
        }

        let only_strings = tokens
            .iter()
            .all(|t| matches!(t.kind, TokenKind::Str | TokenKind::Comment));
        let kind = if text.trim().is_empty() && !starts_in_string {
            LineKind::Blank
        } else if starts_in_string && in_docstring {
            LineKind::DocString
        } else {
            match tokens.first().map(|t| t.kind) {
                Some(TokenKind::Comment) => LineKind::Comment,
                Some(TokenKind::Str) if statement_string && only_strings => LineKind::DocString,
                _ => LineKind::Code,
            }
        };

        Line {
            number,
            text: text.to_string(),
            offset,
            indent: compute_indent(text),
            trailing_whitespace: text.ends_with([' ', '\t']),
            visible_length: chars.len(),
            kind,
            tokens,
            continuation,
            starts_in_string,
            depth_at_start,
        }
    }

    /// Lexes a string literal whose opening quote is at `quote_index`.
    /// Returns the char index just past the literal (or end of line).
    fn string_literal(
        &mut self,
        chars: &[(usize, char)],
        quote_index: usize,
        line: usize,
        statement: bool,
    ) -> usize {
        let quote = chars[quote_index].1;
        let triple = chars.get(quote_index + 1).is_some_and(|&(_, c)| c == quote)
            && chars.get(quote_index + 2).is_some_and(|&(_, c)| c == quote);
        let open = OpenString {
            quote,
            triple,
            line,
            statement,
        };
        let body_start = quote_index + if triple { 3 } else { 1 };
        self.string_body(chars, body_start, open)
    }

    /// Scans string contents from `from` until the closing delimiter.
    fn string_body(&mut self, chars: &[(usize, char)], from: usize, open: OpenString) -> usize {
        let mut i = from;
        while i < chars.len() {
            let c = chars[i].1;
            if c == '\\' {
                if i + 1 >= chars.len() {
                    // Escaped newline: the literal continues on the next line.
                    self.string = Some(open);
                    return chars.len();
                }
                i += 2;
                continue;
            }
            if c == open.quote {
                if !open.triple {
                    self.string = None;
                    return i + 1;
                }
                if chars.get(i + 1).is_some_and(|&(_, n)| n == open.quote)
                    && chars.get(i + 2).is_some_and(|&(_, n)| n == open.quote)
                {
                    self.string = None;
                    return i + 3;
                }
            }
            i += 1;
        }

        if open.triple {
            self.string = Some(open);
        } else {
            self.string = None;
            self.note(open.line, MalformedKind::UnterminatedString);
        }
        chars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &Line) -> Vec<TokenKind> {
        line.tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(line: &Line) -> Vec<&str> {
        line.tokens.iter().map(|t| line.token_text(t)).collect()
    }

    #[test]
    fn splits_lines_without_trailing_empty_line() {
        let file = scan_str("a = 1\nb = 2\n", "t.py");
        assert_eq!(file.lines.len(), 2);
        assert_eq!(file.lines[1].number, 2);
        assert_eq!(file.lines[1].offset, 6);
    }

    #[test]
    fn empty_input_has_no_lines() {
        let file = scan_str("", "t.py");
        assert!(file.lines.is_empty());
        assert!(file.is_all_blank());
    }

    #[test]
    fn preserves_trailing_whitespace_and_strips_crlf() {
        let file = scan_str("x = 1  \r\ny = 2\r\n", "t.py");
        assert_eq!(file.lines[0].text, "x = 1  ");
        assert!(file.lines[0].trailing_whitespace);
        assert!(!file.lines[1].trailing_whitespace);
        assert_eq!(file.lines[1].visible_length, 5);
    }

    #[test]
    fn lone_carriage_return_ends_a_line() {
        let file = scan_str("x = 1\r y = 2\r", "t.py");
        assert_eq!(file.lines.len(), 2);
        assert_eq!(file.lines[0].text, "x = 1");
        assert_eq!(file.lines[1].text, " y = 2");
        assert_eq!(file.lines[1].offset, 6);
        assert_eq!(file.lines[1].indent.width, 1);
    }

    #[test]
    fn mixed_terminators_keep_offsets() {
        let file = scan_str("a\r\nb\rc\nd", "t.py");
        let starts: Vec<usize> = file.lines.iter().map(|l| l.offset).collect();
        assert_eq!(starts, vec![0, 3, 5, 7]);
        assert_eq!(file.lines[3].text, "d");
    }

    #[test]
    fn computes_indentation() {
        let file = scan_str("    x\n\t y\n", "t.py");
        assert_eq!(file.lines[0].indent.width, 4);
        assert!(!file.lines[0].indent.has_tab);
        assert_eq!(file.lines[1].indent.width, 2);
        assert!(file.lines[1].indent.has_tab);
        assert!(file.lines[1].indent.mixed);
        assert_eq!(file.lines[1].indent.first_char, Some('\t'));
    }

    #[test]
    fn tokenizes_call_with_operators() {
        let file = scan_str("result = foo(a, b=2) == None\n", "t.py");
        let line = &file.lines[0];
        assert_eq!(
            texts(line),
            vec!["result", "=", "foo", "(", "a", ",", "b", "=", "2", ")", "==", "None"]
        );
        assert_eq!(line.tokens[3].kind, TokenKind::Open);
        assert_eq!(line.tokens[5].depth, 1);
        assert_eq!(line.tokens[5].enclosing, Some('('));
    }

    #[test]
    fn comments_and_strings_are_single_tokens() {
        let file = scan_str("x = 'a , b'  # note ( here\n", "t.py");
        let line = &file.lines[0];
        assert_eq!(
            kinds(line),
            vec![
                TokenKind::Name,
                TokenKind::Operator,
                TokenKind::Str,
                TokenKind::Comment
            ]
        );
        assert_eq!(line.text_at(2), "'a , b'");
        assert_eq!(line.gap_before(3), Some(2));
    }

    #[test]
    fn string_prefixes_and_escapes() {
        let file = scan_str("s = rb'\\'' + f\"{x}\"\n", "t.py");
        let line = &file.lines[0];
        assert_eq!(texts(line), vec!["s", "=", "rb'\\''", "+", "f\"{x}\""]);
        assert!(file.malformed.is_none());
    }

    #[test]
    fn multiline_docstring_lines_are_classified() {
        let src = "def f():\n    \"\"\"Summary.\n\n    More text.\n    \"\"\"\n    return 1\n";
        let file = scan_str(src, "t.py");
        assert_eq!(file.lines[1].kind, LineKind::DocString);
        assert_eq!(file.lines[2].kind, LineKind::DocString);
        assert!(file.lines[2].starts_in_string);
        assert_eq!(file.lines[4].kind, LineKind::DocString);
        assert_eq!(file.lines[5].kind, LineKind::Code);
        assert!(!file.lines[5].continuation);
    }

    #[test]
    fn assigned_multiline_string_is_code() {
        let file = scan_str("x = \"\"\"a\nb\"\"\"\n", "t.py");
        assert_eq!(file.lines[0].kind, LineKind::Code);
        assert_eq!(file.lines[1].kind, LineKind::Code);
        assert!(file.lines[1].continuation);
    }

    #[test]
    fn bracket_continuation_is_tracked() {
        let file = scan_str("x = [\n    1,\n]\ny = 2\n", "t.py");
        assert!(!file.lines[0].continuation);
        assert!(file.lines[1].continuation);
        assert_eq!(file.lines[1].depth_at_start, 1);
        assert!(file.lines[2].continuation);
        assert!(!file.lines[3].continuation);
    }

    #[test]
    fn backslash_continuation_is_tracked() {
        let file = scan_str("x = 1 + \\\n    2\n", "t.py");
        assert!(file.lines[0].ends_with_backslash());
        assert!(file.lines[1].continuation);
    }

    #[test]
    fn comment_and_blank_kinds() {
        let file = scan_str("# header\n\n   \nx = 1\n", "t.py");
        assert_eq!(file.lines[0].kind, LineKind::Comment);
        assert!(file.lines[1].is_blank());
        assert!(file.lines[2].is_blank());
        assert_eq!(file.lines[3].kind, LineKind::Code);
    }

    #[test]
    fn unterminated_triple_string_is_malformed() {
        let file = scan_str("x = 1\ns = \"\"\"never\nclosed\n", "t.py");
        let malformed = file.malformed.unwrap();
        assert_eq!(malformed.line, 2);
        assert_eq!(malformed.kind, MalformedKind::UnterminatedString);
    }

    #[test]
    fn unterminated_single_quote_is_malformed_but_scan_continues() {
        let file = scan_str("s = 'oops\nt = 1\n", "t.py");
        assert_eq!(file.malformed.unwrap().line, 1);
        assert!(!file.lines[1].continuation);
        assert_eq!(file.lines[1].text_at(0), "t");
    }

    #[test]
    fn unclosed_bracket_is_malformed() {
        let file = scan_str("x = foo(\n    1,\n", "t.py");
        assert_eq!(
            file.malformed.unwrap().kind,
            MalformedKind::UnclosedBracket('(')
        );
    }

    #[test]
    fn unmatched_close_is_malformed() {
        let file = scan_str("x = 1)\n", "t.py");
        assert_eq!(
            file.malformed.unwrap().kind,
            MalformedKind::UnmatchedClose(')')
        );
    }

    #[test]
    fn numbers_with_exponents() {
        let file = scan_str("x = 1e-5 + 0x1F + .5\n", "t.py");
        assert_eq!(texts(&file.lines[0]), vec!["x", "=", "1e-5", "+", "0x1F", "+", ".5"]);
    }

    #[test]
    fn walrus_and_arrow_are_operators() {
        let file = scan_str("def f(x) -> int: return (y := x)\n", "t.py");
        let line = &file.lines[0];
        assert!(texts(line).contains(&"->"));
        assert!(texts(line).contains(&":="));
        assert_eq!(
            line.tokens.iter().filter(|t| t.kind == TokenKind::Colon).count(),
            1
        );
    }

    #[test]
    fn invalid_utf8_reports_position() {
        let err = scan(b"ok = 1\nbad = \xff\n", "t.py", EncodingHint::Utf8).unwrap_err();
        assert_eq!(err, EncodingError::InvalidUtf8 { line: 2, column: 7 });
    }

    #[test]
    fn latin1_declaration_is_rejected() {
        let err = scan(b"# -*- coding: latin-1 -*-\nx = 1\n", "t.py", EncodingHint::Declared)
            .unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedDeclaration { line: 1, .. }));
    }

    #[test]
    fn utf8_declaration_is_accepted() {
        let file = scan(b"#!/usr/bin/env python\n# coding=utf_8\nx = 1\n", "t.py", EncodingHint::Declared)
            .unwrap();
        assert_eq!(file.lines.len(), 3);
    }

    #[test]
    fn utf8_hint_ignores_declaration() {
        assert!(scan(b"# coding: latin-1\n", "t.py", EncodingHint::Utf8).is_ok());
    }

    #[test]
    fn bom_is_stripped() {
        let file = scan_str("\u{feff}x = 1\n", "t.py");
        assert_eq!(file.lines[0].text, "x = 1");
        assert_eq!(file.lines[0].offset, 3);
    }

    #[test]
    fn columns_count_characters() {
        let file = scan_str("s = 'é' ,\n", "t.py");
        let line = &file.lines[0];
        let comma = &line.tokens[3];
        assert_eq!(line.column(comma.start), 9);
    }

    #[test]
    fn scanning_is_deterministic() {
        let src = "import os\n\n\ndef f(a, b):\n    return a\n";
        assert_eq!(scan_str(src, "t.py"), scan_str(src, "t.py"));
    }
}
