//! Context types for rule execution.

use crate::source::{Line, SourceFile, Token};
use crate::state::EvaluationState;
use crate::types::Location;

/// Context provided to rules for one line of a file.
///
/// Carries the scanned file, the line under evaluation and a read-only
/// view of the evaluator's cross-line state at that line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// The whole scanned file.
    pub file: &'a SourceFile,
    /// The line being evaluated.
    pub line: &'a Line,
    /// Evaluation state snapshot at this line.
    pub state: &'a EvaluationState,
}

impl<'a> LineContext<'a> {
    /// Creates a new line context.
    #[must_use]
    pub fn new(file: &'a SourceFile, line: &'a Line, state: &'a EvaluationState) -> Self {
        Self { file, line, state }
    }

    /// Location of the character at byte offset `byte` within the line,
    /// spanning `length` bytes.
    #[must_use]
    pub fn location_at(&self, byte: usize, length: usize) -> Location {
        Location::new(&self.file.identifier, self.line.number, self.line.column(byte))
            .with_span(self.line.offset + byte, length)
    }

    /// Location of a token.
    #[must_use]
    pub fn token_location(&self, token: &Token) -> Location {
        self.location_at(token.start, token.end - token.start)
    }

    /// Location covering the whole line, without a column.
    #[must_use]
    pub fn line_location(&self) -> Location {
        Location::line(&self.file.identifier, self.line.number)
            .with_span(self.line.offset, self.line.text.len())
    }
}
