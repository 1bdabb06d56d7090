//! Cross-line evaluation state.
//!
//! [`EvaluationState`] is owned by the evaluator and updated exactly twice
//! per line: [`EvaluationState::begin_line`] before any rule runs and
//! [`EvaluationState::end_line`] after all rules have run. Rules only ever
//! see a shared reference.

use std::collections::HashMap;

use crate::imports::{ImportClassifier, ImportGroup, ImportStatement};
use crate::source::{Line, LineKind, SourceFile, TokenKind};
use crate::syntax::{AssignOp, Assignment};

/// Kind of block opened by a compound statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `class` body.
    Class,
    /// `def` body.
    Function,
    /// `for` / `while` body.
    Loop,
    /// Any other compound statement.
    Other,
}

/// An open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// What opened it.
    pub kind: BlockKind,
    /// Indentation width of the header line.
    pub indent: usize,
    /// Line of the header.
    pub line: usize,
}

/// Coarse kind of a logical statement, taken from its first words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `class ...`
    Class,
    /// `def ...` or `async def ...`
    Function,
    /// `@decorator`
    Decorator,
    /// `import ...` or `from ... import ...`
    Import,
    /// `for`, `while`, `async for`
    Loop,
    /// `if`, `try`, `with` and other block headers.
    Compound,
    /// Anything else.
    Other,
}

impl StatementKind {
    /// Classifies the statement starting on `line`.
    #[must_use]
    pub fn of(line: &Line) -> Self {
        let first = line.text_at(0);
        let word = if first == "async" { line.text_at(1) } else { first };
        let ends_with_colon = line
            .last_code_token()
            .is_some_and(|t| t.kind == TokenKind::Colon);
        match word {
            "class" => Self::Class,
            "def" => Self::Function,
            "for" | "while" => Self::Loop,
            "import" | "from" if first != "async" => Self::Import,
            "if" | "elif" | "else" | "try" | "except" | "finally" | "with" => Self::Compound,
            "match" | "case" if ends_with_colon => Self::Compound,
            "@" => Self::Decorator,
            _ => Self::Other,
        }
    }

    /// Returns the block kind this statement opens, if any.
    #[must_use]
    pub fn block(self) -> Option<BlockKind> {
        match self {
            Self::Class => Some(BlockKind::Class),
            Self::Function => Some(BlockKind::Function),
            Self::Loop => Some(BlockKind::Loop),
            Self::Compound => Some(BlockKind::Other),
            Self::Decorator | Self::Import | Self::Other => None,
        }
    }
}

/// A logical statement as seen from its first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// First line of the statement.
    pub line: usize,
    /// Indentation width of the first line.
    pub indent: usize,
    /// Coarse kind.
    pub kind: StatementKind,
    /// First word of the statement (`""` if it starts with a symbol).
    pub first_word: String,
    /// Whether the statement's last code token so far is a `:`.
    pub ends_with_colon: bool,
}

/// A module-level binding of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Line of the binding.
    pub line: usize,
    /// Whether this binding assigns a single literal to the bare name.
    pub literal: bool,
}

/// Every module-scope binding in a file, collected before the pass.
///
/// Deciding whether a name is "never reassigned" needs to see the whole
/// file, so this is the one piece of state built ahead of the line loop.
#[derive(Debug, Clone, Default)]
pub struct ModuleBindings {
    by_name: HashMap<String, Vec<Binding>>,
    by_line: HashMap<usize, Vec<String>>,
}

impl ModuleBindings {
    /// Collects module-scope bindings from `file`.
    #[must_use]
    pub fn collect(file: &SourceFile) -> Self {
        let mut bindings = Self::default();
        // Names declared `global`, with the indentation of the declaring body.
        let mut declared: Vec<(String, usize)> = Vec::new();
        for line in &file.lines {
            if !line.starts_statement() || line.kind != LineKind::Code {
                continue;
            }
            let indent = line.indent.width;
            declared.retain(|(_, body)| indent >= *body);

            if line.text_at(0) == "global" {
                declared.extend(
                    line.tokens
                        .iter()
                        .skip(1)
                        .filter(|t| t.kind == TokenKind::Name)
                        .map(|t| (line.token_text(t).to_string(), indent)),
                );
                continue;
            }
            if indent != 0 {
                // Only an assignment after `global` rebinds the module name.
                if let Some(assignment) = Assignment::parse(line) {
                    for name in assignment.names(line) {
                        if declared.iter().any(|(n, _)| n == name) {
                            bindings.add(name, line.number, false);
                        }
                    }
                }
                continue;
            }
            if line.text_at(0) == "for" {
                for token in line.tokens.iter().skip(1) {
                    let text = line.token_text(token);
                    if text == "in" {
                        break;
                    }
                    if token.kind == TokenKind::Name {
                        bindings.add(text, line.number, false);
                    }
                }
                continue;
            }
            if let Some(assignment) = Assignment::parse(line) {
                let literal = assignment.single
                    && assignment.literal
                    && assignment.op != AssignOp::Augmented;
                for name in assignment.names(line) {
                    bindings.add(name, line.number, literal);
                }
            }
        }
        bindings
    }

    fn add(&mut self, name: &str, line: usize, literal: bool) {
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push(Binding { line, literal });
        self.by_line.entry(line).or_default().push(name.to_string());
    }

    /// Returns every binding of `name`, in line order.
    #[must_use]
    pub fn bindings(&self, name: &str) -> &[Binding] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns the names bound on `line`.
    #[must_use]
    pub fn bound_on(&self, line: usize) -> &[String] {
        self.by_line.get(&line).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `name` is bound exactly once, to a literal.
    #[must_use]
    pub fn is_constant_candidate(&self, name: &str) -> bool {
        matches!(self.bindings(name), [only] if only.literal)
    }
}

/// Mutable per-file memory for rules that span more than one line.
#[derive(Debug, Clone)]
pub struct EvaluationState {
    /// Consecutive blank lines seen immediately before the current line.
    pub blank_run: usize,
    /// Blank lines before the current statement, looking through any
    /// comment block that directly precedes it.
    pub blank_before: usize,
    /// Blank lines that preceded the current comment block, if any.
    pub comment_lead: Option<usize>,
    /// Indentation widths of enclosing levels; always starts with `0`.
    pub indent_stack: Vec<usize>,
    /// Whether the current statement dedents to an unknown level.
    pub dedent_mismatch: bool,
    /// Open blocks, innermost last.
    pub blocks: Vec<Block>,
    /// Highest import group seen at module level so far.
    pub import_group: ImportGroup,
    /// Line of the last module-level import.
    pub last_import_line: Option<usize>,
    /// Statement before the current one.
    pub previous: Option<Statement>,
    /// Current statement.
    pub statement: Option<Statement>,
    /// Import recognised on the current line, with its group.
    pub current_import: Option<(ImportStatement, ImportGroup)>,
    /// Whether any code or docstring statement has been seen.
    pub seen_code: bool,
    /// Module-scope bindings of the whole file.
    pub bindings: ModuleBindings,
    classifier: ImportClassifier,
}

impl EvaluationState {
    /// Creates fresh state for `file`.
    #[must_use]
    pub fn new(file: &SourceFile, classifier: ImportClassifier) -> Self {
        Self {
            blank_run: 0,
            blank_before: 0,
            comment_lead: None,
            indent_stack: vec![0],
            dedent_mismatch: false,
            blocks: Vec::new(),
            import_group: ImportGroup::NoneYet,
            last_import_line: None,
            previous: None,
            statement: None,
            current_import: None,
            seen_code: false,
            bindings: ModuleBindings::collect(file),
            classifier,
        }
    }

    /// Innermost enclosing class, function or loop block.
    #[must_use]
    pub fn innermost_scope(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .rev()
            .find(|b| b.kind != BlockKind::Other)
    }

    /// Whether the current line sits in a loop body that is not itself
    /// inside a nested function or class.
    #[must_use]
    pub fn in_loop(&self) -> bool {
        self.innermost_scope()
            .is_some_and(|b| b.kind == BlockKind::Loop)
    }

    /// Whether the current line is at module or class scope.
    #[must_use]
    pub fn at_namespace_scope(&self) -> bool {
        self.blocks
            .iter()
            .rev()
            .find(|b| matches!(b.kind, BlockKind::Class | BlockKind::Function))
            .map_or(true, |b| b.kind == BlockKind::Class)
    }

    /// Updates state for `line` before rules run on it.
    pub fn begin_line(&mut self, line: &Line) {
        if line.is_blank() {
            self.blank_run += 1;
            return;
        }

        if line.kind == LineKind::Comment && !line.continuation {
            if self.comment_lead.is_none() || self.blank_run > 0 {
                self.comment_lead = Some(self.blank_run);
            }
            return;
        }

        if !line.starts_statement() {
            self.current_import = None;
            return;
        }

        self.blank_before = match self.comment_lead {
            Some(lead) if self.blank_run == 0 => lead,
            _ => self.blank_run,
        };

        let width = line.indent.width;
        self.dedent_mismatch = false;
        let top = self.indent_stack.last().copied().unwrap_or(0);
        if width > top {
            self.indent_stack.push(width);
        } else if width < top {
            while self.indent_stack.last().is_some_and(|&w| w > width) {
                self.indent_stack.pop();
            }
            if self.indent_stack.last() != Some(&width) {
                self.dedent_mismatch = true;
                self.indent_stack.push(width);
            }
        }
        while self.blocks.last().is_some_and(|b| b.indent >= width) {
            self.blocks.pop();
        }

        let kind = if line.kind == LineKind::DocString {
            StatementKind::Other
        } else {
            StatementKind::of(line)
        };
        let first_word = line
            .tokens
            .first()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| line.token_text(t).to_string())
            .unwrap_or_default();
        self.previous = self.statement.take();
        self.statement = Some(Statement {
            line: line.number,
            indent: width,
            kind,
            first_word,
            ends_with_colon: false,
        });

        self.current_import = if kind == StatementKind::Import {
            ImportStatement::parse(line).map(|import| {
                let group = self.classifier.classify(&import);
                (import, group)
            })
        } else {
            None
        };
    }

    /// Updates state for `line` after all rules have run on it.
    pub fn end_line(&mut self, line: &Line) {
        if line.is_blank() {
            return;
        }
        if line.kind == LineKind::Comment {
            self.blank_run = 0;
            return;
        }

        if line.starts_statement() {
            if let Some(statement) = &self.statement {
                if let Some(kind) = statement.kind.block() {
                    self.blocks.push(Block {
                        kind,
                        indent: statement.indent,
                        line: statement.line,
                    });
                }
            }
            if let Some((_, group)) = &self.current_import {
                if line.indent.width == 0 {
                    self.import_group = self.import_group.max(*group);
                    self.last_import_line = Some(line.number);
                }
            }
            self.seen_code = true;
            self.comment_lead = None;
        }

        if let Some(statement) = &mut self.statement {
            if let Some(token) = line.last_code_token() {
                statement.ends_with_colon = token.kind == TokenKind::Colon;
            }
        }
        self.blank_run = 0;
    }
}
