//! Core types for style violations and batch results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Severity level for style violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should be addressed, but does not break conformance.
    Warning,
    /// Breaks conformance.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            other => Err(format!(
                "unknown severity `{other}`. Valid values: error, warning"
            )),
        }
    }
}

/// Rule category, mirroring the sections of the style guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Indentation width and characters.
    Indentation,
    /// Maximum line length.
    LineLength,
    /// Blank-line cadence around definitions.
    BlankLines,
    /// Import statements and grouping.
    Imports,
    /// Identifier naming conventions.
    Naming,
    /// Whitespace in expressions and statements.
    Whitespace,
    /// Block and inline comments.
    Comments,
    /// Docstring delimiters.
    Docstrings,
    /// Programming recommendations.
    Other,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Indentation,
        Self::LineLength,
        Self::BlankLines,
        Self::Imports,
        Self::Naming,
        Self::Whitespace,
        Self::Comments,
        Self::Docstrings,
        Self::Other,
    ];

    /// Returns the kebab-case name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indentation => "indentation",
            Self::LineLength => "line-length",
            Self::BlankLines => "blank-lines",
            Self::Imports => "imports",
            Self::Naming => "naming",
            Self::Whitespace => "whitespace",
            Self::Comments => "comments",
            Self::Docstrings => "docstrings",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location of a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Opaque identifier of the checked source (usually a path).
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters), when the violation has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Byte offset in the source (for miette integration).
    #[serde(skip)]
    pub offset: usize,
    /// Length of the span in bytes.
    #[serde(skip)]
    pub length: usize,
}

impl Location {
    /// Creates a location covering a whole line.
    #[must_use]
    pub fn line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location with an explicit column.
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: Some(column),
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A style violation found during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "PS201").
    pub code: String,
    /// Rule id (e.g., "line-length").
    pub rule: String,
    /// Category of the rule that produced this violation.
    pub category: Category,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        category: Category,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            category,
            severity,
            location,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Returns the (line, column) part of the report ordering key.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.location.line, self.location.column.unwrap_or(0))
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}",
            self.code, self.rule, self.location.file, self.location.line
        );
        if let Some(column) = self.location.column {
            let _ = write!(output, ":{column}");
        }
        output.push('\n');
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.location.file, self.location.line)?;
        if let Some(column) = self.location.column {
            write!(f, ":{column}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.code, self.message)
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// A file that could not be evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Identifier of the failed source.
    pub identifier: String,
    /// Why evaluation was aborted.
    pub message: String,
}

/// Result of checking a batch of sources.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// One report per evaluated source, in input order.
    pub reports: Vec<Report>,
    /// Sources whose evaluation was aborted (e.g. invalid encoding).
    pub failures: Vec<FileFailure>,
    /// Sources skipped because the batch was cancelled before they started.
    pub skipped: Vec<String>,
    /// Number of sources that produced a report.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over every violation of every report.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.reports.iter().flat_map(|r| r.violations.iter())
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        self.reports.iter().fold((0, 0), |(errors, warnings), r| {
            (
                errors + r.count(Severity::Error),
                warnings + r.count(Severity::Warning),
            )
        })
    }
}
